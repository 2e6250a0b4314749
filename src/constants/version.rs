use semver::Version;

// one release name per calendar month.
const RELEASE_NAMES: [&str; 12] = [
    "Seneca",
    "Aurelius",
    "Epictetus",
    "Confucius",
    "Laozi",
    "Rumi",
    "Montaigne",
    "Emerson",
    "Thoreau",
    "Angelou",
    "Twain",
    "Wilde",
];

fn release_name(version: &Version) -> &'static str {
    let month = version.minor.clamp(1, 12) as usize;

    RELEASE_NAMES[month - 1]
}

pub fn get_version() -> String {
    let semver = env!("CARGO_PKG_VERSION").parse::<Version>();

    match semver {
        Ok(semver) => {
            let sha = env!("VERGEN_GIT_SHA");

            if sha == "VERGEN_IDEMPOTENT_OUTPUT" {
                format!("{} - {}", semver, release_name(&semver))
            } else {
                format!(
                    "{} - {} [`{}`]",
                    semver,
                    release_name(&semver),
                    &sha[..sha.len().min(7)]
                )
            }
        }
        Err(_) => {
            tracing::warn!("couldn't parse a semver out of Cargo.toml? defaulting to 0.0.0-unknown.");
            String::from("0.0.0-unknown - No Release Name")
        }
    }
}
