//! Canonical call signatures.
//!
//! A [`Signature`] names a return type and an ordered parameter type list.
//! Two callables are call-compatible exactly when their signatures are equal;
//! there is no covariant or partial matching.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

use rustc_hash::FxHashMap;

use crate::{ParamList, TypeAdapter, TypeHash};

struct SignatureInner {
    text: String,
    hash: TypeHash,
    return_type: TypeHash,
    param_types: Vec<TypeHash>,
}

/// Immutable signature of a callable.
///
/// The canonical text reads `ret(p0,p1,...)`, for example `int(int,string)`.
/// Cloning is cheap and shares the same allocation.
#[derive(Clone)]
pub struct Signature {
    inner: Arc<SignatureInner>,
}

type CacheKey = (TypeId, TypeId);

fn cache() -> &'static Mutex<FxHashMap<CacheKey, Signature>> {
    static CACHE: OnceLock<Mutex<FxHashMap<CacheKey, Signature>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(FxHashMap::default()))
}

impl Signature {
    /// Build a signature from type names.
    ///
    /// Deterministic and order-sensitive.
    pub fn build(return_type: &str, param_types: &[&str]) -> Self {
        let text = format!("{}({})", return_type, param_types.join(","));
        let return_hash = TypeHash::from_name(return_type);
        let param_hashes: Vec<TypeHash> =
            param_types.iter().map(|name| TypeHash::from_name(name)).collect();
        Self::from_parts(text, return_hash, param_hashes)
    }

    fn from_parts(text: String, return_type: TypeHash, param_types: Vec<TypeHash>) -> Self {
        Self {
            inner: Arc::new(SignatureInner {
                hash: TypeHash::from_signature(return_type, &param_types),
                text,
                return_type,
                param_types,
            }),
        }
    }

    /// Signature of a callable returning `R` and taking `A`.
    ///
    /// Computed once per `(R, A)` combination and cached for the process.
    pub fn of<R: TypeAdapter, A: ParamList>() -> Self {
        let key = (TypeId::of::<R>(), TypeId::of::<A>());
        let mut cache = cache()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cache
            .entry(key)
            .or_insert_with(|| Self::build(R::type_name(), &A::type_names()))
            .clone()
    }

    /// Signature of an unbound callable: empty text and an empty hash.
    pub fn unbound() -> Self {
        static UNBOUND: OnceLock<Signature> = OnceLock::new();
        UNBOUND
            .get_or_init(|| Self {
                inner: Arc::new(SignatureInner {
                    text: String::new(),
                    hash: TypeHash::EMPTY,
                    return_type: TypeHash::EMPTY,
                    param_types: Vec::new(),
                }),
            })
            .clone()
    }

    /// Canonical text.
    pub fn text(&self) -> &str {
        &self.inner.text
    }

    /// Signature hash.
    pub fn hash(&self) -> TypeHash {
        self.inner.hash
    }

    /// Return type hash.
    pub fn return_type(&self) -> TypeHash {
        self.inner.return_type
    }

    /// Parameter type hashes, in order.
    pub fn param_types(&self) -> &[TypeHash] {
        &self.inner.param_types
    }

    /// Type of parameter `index`, or [`TypeHash::EMPTY`] when out of range.
    pub fn param_type(&self, index: usize) -> TypeHash {
        self.inner
            .param_types
            .get(index)
            .copied()
            .unwrap_or(TypeHash::EMPTY)
    }

    /// Number of parameters.
    pub fn arity(&self) -> usize {
        self.inner.param_types.len()
    }

    /// Check if this is the signature of an unbound callable.
    pub fn is_unbound(&self) -> bool {
        self.inner.text.is_empty()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.hash == other.inner.hash && self.inner.text == other.inner.text)
    }
}

impl Eq for Signature {}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash.hash(state);
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.inner.text)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.text)
    }
}
