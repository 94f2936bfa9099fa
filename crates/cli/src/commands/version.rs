//! `version` command implementation.

/// `nf-smtp v<version>`
pub fn version_line() -> String {
    format!("nf-smtp v{}", env!("CARGO_PKG_VERSION"))
}

/// Execute the `version` command
pub fn print_version() {
    println!("{}", version_line());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        assert!(version_line().starts_with("nf-smtp v"));
        assert!(version_line().ends_with(env!("CARGO_PKG_VERSION")));
    }
}
