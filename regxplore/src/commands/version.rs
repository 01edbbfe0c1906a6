pub fn version_string() -> String {
    format!(
        "regxplore {}\nregxplore-core {}",
        env!("CARGO_PKG_VERSION"),
        regxplore_core::version()
    )
}

pub fn print_version() {
    println!("{}", version_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_includes_both_crate_versions() {
        let s = version_string();
        assert!(s.contains("regxplore "));
        assert!(s.contains("regxplore-core "));
    }
}
