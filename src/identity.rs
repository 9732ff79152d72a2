//! Exception identity resolution.
//!
//! A detection starts from a bare token such as `NullPointerException`. The
//! resolver probes a fixed, ordered list of namespace prefixes and returns
//! the first fully-qualified combination that the known-throwables index
//! recognizes as an exception/error type of the observed runtime. No match
//! is a normal outcome, not an error; the detection is simply discarded.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Namespace prefixes probed in order, mirroring where the observed
/// runtime's well-known throwables live: core language, I/O, networking,
/// database, utility, concurrency, security, XML parsing, text processing.
pub const DEFAULT_NAMESPACE_PREFIXES: &[&str] = &[
    "java.lang.",
    "java.io.",
    "java.net.",
    "java.sql.",
    "java.util.",
    "java.util.concurrent.",
    "java.security.",
    "javax.xml.parsers.",
    "java.text.",
];

/// Fully-qualified throwable types known to the default index.
const DEFAULT_KNOWN_THROWABLES: &[&str] = &[
    // core language
    "java.lang.Exception",
    "java.lang.RuntimeException",
    "java.lang.NullPointerException",
    "java.lang.ArrayIndexOutOfBoundsException",
    "java.lang.StringIndexOutOfBoundsException",
    "java.lang.IndexOutOfBoundsException",
    "java.lang.ArithmeticException",
    "java.lang.NumberFormatException",
    "java.lang.IllegalArgumentException",
    "java.lang.IllegalStateException",
    "java.lang.ClassNotFoundException",
    "java.lang.ClassCastException",
    "java.lang.UnsupportedOperationException",
    "java.lang.InterruptedException",
    "java.lang.ArrayStoreException",
    "java.lang.NegativeArraySizeException",
    "java.lang.CloneNotSupportedException",
    "java.lang.StackOverflowError",
    "java.lang.OutOfMemoryError",
    "java.lang.NoClassDefFoundError",
    "java.lang.AssertionError",
    "java.lang.LinkageError",
    "java.lang.ExceptionInInitializerError",
    // I/O
    "java.io.IOException",
    "java.io.FileNotFoundException",
    "java.io.UncheckedIOException",
    "java.io.EOFException",
    "java.io.InterruptedIOException",
    "java.io.NotSerializableException",
    // networking
    "java.net.SocketException",
    "java.net.SocketTimeoutException",
    "java.net.ConnectException",
    "java.net.UnknownHostException",
    "java.net.MalformedURLException",
    "java.net.BindException",
    // database
    "java.sql.SQLException",
    "java.sql.SQLTimeoutException",
    "java.sql.SQLSyntaxErrorException",
    // utility
    "java.util.NoSuchElementException",
    "java.util.ConcurrentModificationException",
    "java.util.MissingResourceException",
    "java.util.EmptyStackException",
    // concurrency
    "java.util.concurrent.TimeoutException",
    "java.util.concurrent.ExecutionException",
    "java.util.concurrent.CancellationException",
    "java.util.concurrent.RejectedExecutionException",
    // security
    "java.security.GeneralSecurityException",
    "java.security.NoSuchAlgorithmException",
    "java.security.InvalidKeyException",
    // XML parsing
    "javax.xml.parsers.ParserConfigurationException",
    // text processing
    "java.text.ParseException",
];

/// Canonical identity of a resolved exception/error type.
///
/// Equality and hashing are by canonical (fully-qualified) name only. The
/// identity is a plain value recomputed per lookup; it is never cached
/// across runs.
///
/// # Examples
///
/// ```
/// use faultline::IdentityResolver;
///
/// let resolver = IdentityResolver::default();
/// let identity = resolver.resolve("NullPointerException").unwrap();
/// assert_eq!(identity.canonical_name(), "java.lang.NullPointerException");
/// assert_eq!(identity.simple_name(), "NullPointerException");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionIdentity {
    canonical_name: String,
    simple_name: String,
}

impl ExceptionIdentity {
    /// Creates an identity from a canonical name and its simple name.
    #[must_use]
    pub fn new(canonical_name: impl Into<String>, simple_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            simple_name: simple_name.into(),
        }
    }

    /// The fully-qualified name, e.g. `java.lang.NullPointerException`.
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// The bare type name, e.g. `NullPointerException`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }
}

impl PartialEq for ExceptionIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name == other.canonical_name
    }
}

impl Eq for ExceptionIdentity {}

impl std::hash::Hash for ExceptionIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_name.hash(state);
    }
}

impl fmt::Display for ExceptionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name)
    }
}

/// Index of fully-qualified names known to denote throwable types.
///
/// The observed runtime is a foreign process, so membership here stands in
/// for a subtype-of-throwable check. The built-in set covers the well-known
/// throwables of the default namespaces; callers observing exotic runtimes
/// can supply their own.
#[derive(Debug, Clone)]
pub struct ThrowableIndex {
    names: HashSet<String>,
}

impl ThrowableIndex {
    /// Builds an index from an explicit set of fully-qualified names.
    #[must_use]
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the fully-qualified name denotes a known throwable.
    #[must_use]
    pub fn contains(&self, fully_qualified: &str) -> bool {
        self.names.contains(fully_qualified)
    }

    /// Number of known types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ThrowableIndex {
    fn default() -> Self {
        Self::with_names(DEFAULT_KNOWN_THROWABLES.iter().copied())
    }
}

/// Resolves bare exception names against the ordered namespace prefix list.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    prefixes: Vec<String>,
    index: ThrowableIndex,
}

impl IdentityResolver {
    /// Creates a resolver over an explicit prefix order and index.
    #[must_use]
    pub fn new<I, S>(prefixes: I, index: ThrowableIndex) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            index,
        }
    }

    /// Resolves a bare simple name to its canonical identity.
    ///
    /// Probes each prefix in order and returns the first combination the
    /// index recognizes. Returns `None` when no prefix yields a known
    /// throwable; the lookup is fresh on every call.
    #[must_use]
    pub fn resolve(&self, simple_name: &str) -> Option<ExceptionIdentity> {
        let simple_name = simple_name.trim();
        if simple_name.is_empty() {
            return None;
        }

        for prefix in &self.prefixes {
            let candidate = format!("{prefix}{simple_name}");
            if self.index.contains(&candidate) {
                return Some(ExceptionIdentity::new(candidate, simple_name));
            }
        }

        None
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(
            DEFAULT_NAMESPACE_PREFIXES.iter().copied(),
            ThrowableIndex::default(),
        )
    }
}
