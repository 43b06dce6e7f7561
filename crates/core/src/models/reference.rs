//! Deserializers for document references.
//!
//! Use with `#[serde(deserialize_with = "...")]` on fields that hold an id
//! the backend sometimes populates into a full document.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrDoc<T> {
    Id(T),
    Doc {
        #[serde(rename = "_id")]
        id: T,
    },
}

impl<T> IdOrDoc<T> {
    fn into_id(self) -> T {
        match self {
            Self::Id(id) | Self::Doc { id } => id,
        }
    }
}

/// Deserialize a single reference into its id.
///
/// # Errors
///
/// Fails when the value is neither an id nor an object with an `_id`.
pub fn id_or_doc<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    IdOrDoc::deserialize(deserializer).map(IdOrDoc::into_id)
}

/// Deserialize an optional reference into its id.
///
/// # Errors
///
/// Fails when a present value is neither an id nor an object with an `_id`.
pub fn opt_id_or_doc<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<IdOrDoc<T>>::deserialize(deserializer).map(|r| r.map(IdOrDoc::into_id))
}

/// Deserialize a list of references into ids.
///
/// # Errors
///
/// Fails when any element is neither an id nor an object with an `_id`.
pub fn ids_or_docs<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Vec::<IdOrDoc<T>>::deserialize(deserializer)
        .map(|refs| refs.into_iter().map(IdOrDoc::into_id).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use crate::ProductId;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::ids_or_docs")]
        products: Vec<ProductId>,
        #[serde(default, deserialize_with = "super::opt_id_or_doc")]
        featured: Option<ProductId>,
    }

    #[test]
    fn test_mixed_reference_shapes() {
        let holder: Holder = serde_json::from_str(
            r#"{"products": ["p1", {"_id": "p2", "title": "Gray's Anatomy"}], "featured": {"_id": "p3"}}"#,
        )
        .unwrap();

        assert_eq!(holder.products, vec![ProductId::new("p1"), ProductId::new("p2")]);
        assert_eq!(holder.featured, Some(ProductId::new("p3")));
    }

    #[test]
    fn test_missing_optional_reference() {
        let holder: Holder = serde_json::from_str(r#"{"products": []}"#).unwrap();
        assert!(holder.products.is_empty());
        assert!(holder.featured.is_none());
    }

    #[test]
    fn test_rejects_object_without_id() {
        assert!(serde_json::from_str::<Holder>(r#"{"products": [{"title": "x"}]}"#).is_err());
    }
}
