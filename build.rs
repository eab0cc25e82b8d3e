fn main() {
    // CI sets TRIAGIST_VERSION (e.g., "version-abc1234"); otherwise derive from git.
    println!("cargo:rerun-if-env-changed=TRIAGIST_VERSION");
    if let Ok(version) = std::env::var("TRIAGIST_VERSION") {
        println!("cargo:rustc-env=TRIAGIST_VERSION={version}");
    } else {
        let hash = std::process::Command::new("git")
            .args(["rev-parse", "--short=7", "HEAD"])
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .unwrap_or_default()
            .trim()
            .to_string();

        if hash.is_empty() {
            println!("cargo:rustc-env=TRIAGIST_VERSION=dev");
        } else {
            println!("cargo:rustc-env=TRIAGIST_VERSION=version-{hash}");
        }
    }
}
