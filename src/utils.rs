/// Render an error followed by every cause in its source chain, one per line. Used by the `Debug`
/// implementations of our error types so that logs carry the full story.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

/// Replace `&`, `<`, `>`, `"` and `'` with their character entities so user input can be embedded
/// in HTML markup.
pub fn escape_html(input: &str) -> String {
    htmlescape::encode_minimal(input)
}
