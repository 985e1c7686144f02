pub async fn root() -> &'static str {
    concat!(
        "Welcome to the ",
        env!("CARGO_PKG_NAME"),
        " alumni directory. API docs: /docs"
    )
}
