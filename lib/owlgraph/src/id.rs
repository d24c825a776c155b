//! Compact identifiers of graph nodes and relationship types.

/// Derives the compact identifier of an entity from its IRI.
///
/// The local name is the last path segment of the IRI (the one before a
/// trailing slash if there is one). A `#` fragment of this segment becomes
/// the local name, prefixed by `acronym` if the IRI up to its `#` is the
/// ontology IRI `namespace`. An `_` in the local name splits it in an OBO-style
/// id space and local id. The id space is upper-cased.
///
/// ```
/// use owlgraph::normalize_id;
///
/// assert_eq!(normalize_id("http://x.org/a/b#Foo", "TEST", "http://x.org/a/b"), "TEST:Foo");
/// assert_eq!(normalize_id("http://purl.obolibrary.org/obo/GO_0008150", "GO", ""), "GO:0008150");
/// assert_eq!(normalize_id("http://x.org/a/b", "TEST", "http://x.org/a/b"), "b");
/// ```
pub fn normalize_id(uri: &str, acronym: &str, namespace: &str) -> String {
    let segment = match uri.rfind('/') {
        Some(slash) if slash + 1 < uri.len() => &uri[slash + 1..],
        Some(slash) => {
            let head = &uri[..slash];
            head.rfind('/').map_or(head, |slash| &head[slash + 1..])
        }
        None => uri,
    };
    let mut local = if segment.is_empty() { uri } else { segment };

    let mut id_space = "";
    if let Some(hash) = local.find('#').filter(|hash| hash + 1 < local.len()) {
        local = &local[hash + 1..];
        if uri
            .find('#')
            .is_some_and(|hash| uri[..hash] == *namespace.trim_end_matches('#'))
        {
            id_space = acronym;
        }
    }
    if let Some(underscore) = local.find('_').filter(|u| u + 1 < local.len()) {
        if id_space.is_empty() {
            id_space = &local[..underscore];
        }
        local = &local[underscore + 1..];
    }

    if id_space.is_empty() {
        local.to_owned()
    } else {
        format!("{}:{local}", id_space.to_uppercase())
    }
}
