//! Request bodies for WebDAV property methods.

/// `allprop` PROPFIND request.
pub fn propfind_body() -> &'static str {
    concat!(
        r#"<?xml version="1.0" encoding="utf-8"?>"#,
        r#"<D:propfind xmlns:D="DAV:"><D:allprop/></D:propfind>"#
    )
}

/// Wrap a caller-supplied `<prop>` content snippet in a `propertyupdate/set`.
///
/// The snippet is inserted verbatim; it may declare its own namespaces.
pub fn proppatch_body(snippet: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<D:propertyupdate xmlns:D="DAV:"><D:set><D:prop>{}</D:prop></D:set></D:propertyupdate>"#
        ),
        snippet.trim()
    )
}
