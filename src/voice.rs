//! Voice packs: identity -> audio asset + notification line.
//!
//! Resolution is pure and stateless. Each pack holds a static mapping from
//! well-known identities to an asset path and a flavored display line; any
//! identity outside the mapping falls back to the pack's default cue.
//! The variant set is closed: adding a pack is a compile-time change here,
//! not runtime registration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::identity::ExceptionIdentity;

/// A selectable voice pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackVariant {
    /// Battlefield medic persona.
    Medic,
    /// Martial-arts master persona.
    Sensei,
}

impl PackVariant {
    /// Stable machine name, used in settings storage.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Medic => "medic",
            Self::Sensei => "sensei",
        }
    }

    /// Human-readable name for settings UIs.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Medic => "Combat Medic",
            Self::Sensei => "Sensei",
        }
    }

    /// Parses a machine name. An unknown name is a configuration error;
    /// the caller gets no silent substitute.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "medic" => Ok(Self::Medic),
            "sensei" => Ok(Self::Sensei),
            other => Err(ConfigError::UnknownPackVariant {
                name: other.to_string(),
            }),
        }
    }
}

impl Default for PackVariant {
    fn default() -> Self {
        Self::Sensei
    }
}

impl fmt::Display for PackVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Reference to an audio asset shipped with a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CueAsset {
    path: &'static str,
}

impl CueAsset {
    const fn new(path: &'static str) -> Self {
        Self { path }
    }

    /// Resource path of the asset.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }
}

impl fmt::Display for CueAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// A voice pack maps identities to cue assets and notification lines.
pub trait VoicePack: Send + Sync {
    /// The variant this pack implements.
    fn variant(&self) -> PackVariant;

    /// Audio asset for the identity, or the pack default.
    fn sound_for(&self, identity: &ExceptionIdentity) -> CueAsset;

    /// Notification line for the identity, or the pack default.
    fn line_for(&self, identity: &ExceptionIdentity) -> &'static str;
}

/// Returns the pack implementation for a variant.
#[must_use]
pub fn pack_for(variant: PackVariant) -> &'static dyn VoicePack {
    match variant {
        PackVariant::Medic => &MedicPack,
        PackVariant::Sensei => &SenseiPack,
    }
}

struct MedicPack;

impl VoicePack for MedicPack {
    fn variant(&self) -> PackVariant {
        PackVariant::Medic
    }

    fn sound_for(&self, identity: &ExceptionIdentity) -> CueAsset {
        let path = match identity.simple_name() {
            "NullPointerException" => "voice-packs/medic/null-pointer-exception.wav",
            "ArrayIndexOutOfBoundsException" => {
                "voice-packs/medic/array-index-out-of-bounds-exception.wav"
            }
            "ArithmeticException" => "voice-packs/medic/arithmetic-exception.wav",
            "NumberFormatException" => "voice-packs/medic/number-format-exception.wav",
            "IllegalArgumentException" => "voice-packs/medic/illegal-argument-exception.wav",
            // FileNotFoundException shares the I/O cue
            "IOException" | "FileNotFoundException" => "voice-packs/medic/io-exception.wav",
            "ClassNotFoundException" => "voice-packs/medic/class-not-found-exception.wav",
            "StackOverflowError" => "voice-packs/medic/stack-overflow-error.wav",
            "IllegalStateException" => "voice-packs/medic/illegal-state-exception.wav",
            _ => "voice-packs/medic/default.wav",
        };
        CueAsset::new(path)
    }

    fn line_for(&self, identity: &ExceptionIdentity) -> &'static str {
        match identity.simple_name() {
            "NullPointerException" => "Medic: Null pointer. There is nothing there to save.",
            "ArrayIndexOutOfBoundsException" => {
                "Medic: You reached past the end. That wound was self-inflicted."
            }
            "ArithmeticException" => {
                "Medic: Division by zero. I can stitch flesh, not mathematics."
            }
            "NumberFormatException" => "Medic: That was never a number. Stop forcing it.",
            "IllegalArgumentException" => {
                "Medic: Bad input. I can't operate on arguments like that."
            }
            "IOException" | "FileNotFoundException" => {
                "Medic: The stream went dark. Connection lost in the field."
            }
            "ClassNotFoundException" => "Medic: I can't treat a class that was never deployed.",
            "StackOverflowError" => {
                "Medic: Stack overflow. You dug too deep to be carried out."
            }
            "IllegalStateException" => {
                "Medic: You're in no state for this. Fall back and regroup."
            }
            _ => "Medic: Something broke. Hold still while I take a look.",
        }
    }
}

struct SenseiPack;

impl VoicePack for SenseiPack {
    fn variant(&self) -> PackVariant {
        PackVariant::Sensei
    }

    fn sound_for(&self, identity: &ExceptionIdentity) -> CueAsset {
        let path = match identity.simple_name() {
            "NullPointerException" => "voice-packs/sensei/null-pointer-exception.wav",
            "ArrayIndexOutOfBoundsException" => {
                "voice-packs/sensei/array-index-out-of-bounds-exception.wav"
            }
            "ArithmeticException" => "voice-packs/sensei/arithmetic-exception.wav",
            "NumberFormatException" => "voice-packs/sensei/number-format-exception.wav",
            "IllegalArgumentException" => "voice-packs/sensei/illegal-argument-exception.wav",
            "IOException" | "FileNotFoundException" => "voice-packs/sensei/io-exception.wav",
            "ClassNotFoundException" => "voice-packs/sensei/class-not-found-exception.wav",
            "StackOverflowError" => "voice-packs/sensei/stack-overflow-error.wav",
            "IllegalStateException" => "voice-packs/sensei/illegal-state-exception.wav",
            _ => "voice-packs/sensei/default.wav",
        };
        CueAsset::new(path)
    }

    fn line_for(&self, identity: &ExceptionIdentity) -> &'static str {
        match identity.simple_name() {
            "NullPointerException" => {
                "Sensei: You grasped at nothing, and nothing is what you caught."
            }
            "ArrayIndexOutOfBoundsException" => {
                "Sensei: The array has limits. You have not yet learned yours."
            }
            "ArithmeticException" => {
                "Sensei: Dividing by zero? Even the ancients knew better."
            }
            "NumberFormatException" => {
                "Sensei: You cannot bend a word into a number by will alone."
            }
            "IllegalArgumentException" => {
                "Sensei: A poor argument dishonors the function that receives it."
            }
            "IOException" | "FileNotFoundException" => {
                "Sensei: The stream is broken. Listen to what the file system tells you."
            }
            "ClassNotFoundException" => {
                "Sensei: You seek a class that walks on no classpath."
            }
            "StackOverflowError" => {
                "Sensei: Recursion without a base case is a journey without a door."
            }
            "IllegalStateException" => {
                "Sensei: Your object is out of balance. Restore its state first."
            }
            _ => "Sensei: Failure is a teacher. Yours is very busy today.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityResolver;

    fn identity(name: &str) -> ExceptionIdentity {
        IdentityResolver::default().resolve(name).unwrap()
    }

    #[test]
    fn known_identity_maps_to_pack_asset() {
        let pack = pack_for(PackVariant::Medic);
        let asset = pack.sound_for(&identity("NullPointerException"));
        assert_eq!(asset.path(), "voice-packs/medic/null-pointer-exception.wav");
        assert!(pack
            .line_for(&identity("NullPointerException"))
            .starts_with("Medic:"));
    }

    #[test]
    fn unmapped_identity_falls_back_to_default_cue() {
        let pack = pack_for(PackVariant::Sensei);
        let asset = pack.sound_for(&identity("SocketException"));
        assert_eq!(asset.path(), "voice-packs/sensei/default.wav");
        assert!(pack.line_for(&identity("SocketException")).contains("Sensei"));
    }

    #[test]
    fn file_not_found_shares_the_io_cue() {
        let pack = pack_for(PackVariant::Medic);
        assert_eq!(
            pack.sound_for(&identity("FileNotFoundException")),
            pack.sound_for(&identity("IOException"))
        );
    }

    #[test]
    fn variant_names_roundtrip() {
        for variant in [PackVariant::Medic, PackVariant::Sensei] {
            assert_eq!(PackVariant::from_name(variant.name()).unwrap(), variant);
            assert_eq!(pack_for(variant).variant(), variant);
        }
    }

    #[test]
    fn unknown_variant_name_fails_fast() {
        let err = PackVariant::from_name("naruto").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPackVariant { .. }));
    }
}
