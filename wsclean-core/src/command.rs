// wsclean-core/src/command.rs
//! Derives a non-interactive invocation from a raw uninstall command.
//! Best-effort silencing: different installer frameworks recognise
//! different switch families, and unrecognised flags are typically
//! ignored, so both families may be injected together.

use std::path::Path;

/// Splits a raw command line into executable path and argument tail.
/// A leading quote delimits the path up to the matching closing quote;
/// otherwise the path runs to the first space.
pub fn split_command(raw: &str) -> (String, String) {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            let exe = &rest[..end];
            let args = rest[end + 1..].trim_start();
            return (exe.to_string(), args.to_string());
        }
    }
    match raw.find(' ') {
        Some(i) => (
            raw[..i].trim_matches('"').to_string(),
            raw[i + 1..].to_string(),
        ),
        None => (raw.trim_matches('"').to_string(), String::new()),
    }
}

/// Builds a silenced uninstall invocation from the raw registry command.
/// Empty input yields empty output (a no-op signal, not an error). The
/// original argument tail is always preserved after any injected flags,
/// and the executable path is quoted in the result.
pub fn build_silent_command(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let (exe, args) = split_command(raw);

    // Lowercased base filename, for comparison only.
    let exe_name = Path::new(&exe)
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let mut injected = String::new();
    if exe_name == "msiexec.exe" || exe_name == "msiexec" || exe_name.ends_with(".msi") {
        // Windows Installer: /qn (no UI) and /norestart, keeping any
        // existing /x or /i product-code argument untouched.
        if !args.contains("/qn") {
            injected.push_str("/qn ");
        }
        if !args.contains("/norestart") {
            injected.push_str("/norestart ");
        }
    } else {
        // Inno Setup family
        let lowered = args.to_ascii_lowercase();
        if !lowered.contains("/silent") && !lowered.contains("/verysilent") {
            injected.push_str("/VERYSILENT /SUPPRESSMSGBOXES ");
        }
        // NSIS / InstallShield
        if !args.contains("/S ") && !args.ends_with("/S") {
            injected.push_str("/S ");
        }
    }

    if !args.trim().is_empty() {
        injected.push_str(&args);
    }

    format!("\"{}\" {}", exe, injected.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_handles_quoted_path_with_spaces() {
        let (exe, args) = split_command(r#""C:\Program Files\Foo\un.exe" /x /y"#);
        assert_eq!(exe, r"C:\Program Files\Foo\un.exe");
        assert_eq!(args, "/x /y");
    }

    #[test]
    fn split_handles_unquoted_command() {
        let (exe, args) = split_command(r"msiexec.exe /x {GUID} /flag");
        assert_eq!(exe, "msiexec.exe");
        assert_eq!(args, "/x {GUID} /flag");
    }

    #[test]
    fn split_handles_bare_executable() {
        let (exe, args) = split_command(r#""C:\Foo\un.exe""#);
        assert_eq!(exe, r"C:\Foo\un.exe");
        assert_eq!(args, "");
    }

    #[test]
    fn empty_input_is_a_no_op() {
        assert_eq!(build_silent_command(""), "");
        assert_eq!(build_silent_command("   "), "");
    }

    #[test]
    fn generic_executable_gains_both_switch_families() {
        let built = build_silent_command(r#""C:\Foo\un.exe" /x"#);
        assert_eq!(built, r#""C:\Foo\un.exe" /VERYSILENT /SUPPRESSMSGBOXES /S /x"#);
    }

    #[test]
    fn msiexec_gains_quiet_flags_and_keeps_product_code() {
        let built = build_silent_command("msiexec.exe /x {11111111-1111-1111-1111-111111111111}");
        assert_eq!(
            built,
            r#""msiexec.exe" /qn /norestart /x {11111111-1111-1111-1111-111111111111}"#
        );
    }

    #[test]
    fn msiexec_existing_flags_are_not_duplicated() {
        let built = build_silent_command("msiexec.exe /qn /norestart /x {GUID}");
        assert_eq!(built, r#""msiexec.exe" /qn /norestart /x {GUID}"#);
    }

    #[test]
    fn already_silent_executable_keeps_its_flags() {
        let built = build_silent_command(r#""C:\Foo\un.exe" /VERYSILENT /S"#);
        assert_eq!(built, r#""C:\Foo\un.exe" /VERYSILENT /S"#);
    }

    #[test]
    fn build_is_idempotent_for_flag_injection() {
        for raw in [
            r#""C:\Foo\un.exe" /x"#,
            r#"C:\Foo\un.exe"#,
            "msiexec.exe /x {GUID}",
            r#""C:\Program Files\Bar\setup.exe" -uninstall"#,
        ] {
            let once = build_silent_command(raw);
            let twice = build_silent_command(&once);
            assert_eq!(once, twice, "rebuild changed: {raw}");
            for flag in ["/qn", "/norestart", "/VERYSILENT", "/SUPPRESSMSGBOXES"] {
                assert!(
                    twice.matches(flag).count() <= 1,
                    "duplicated {flag} in {twice}"
                );
            }
        }
    }

    #[test]
    fn executable_is_quoted_even_without_spaces() {
        let built = build_silent_command(r"C:\Foo\un.exe");
        assert!(built.starts_with(r#""C:\Foo\un.exe""#));
    }
}
