use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A deployment target a patch can be rendered for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Nginx,
    Apache,
    NextJs,
    Express,
    Netlify,
    Vercel,
    Generic,
    /// Anything we have no dedicated generator for.
    Other(String),
}

impl Platform {
    pub const SUPPORTED: [Platform; 7] = [
        Platform::Nginx,
        Platform::Apache,
        Platform::NextJs,
        Platform::Express,
        Platform::Netlify,
        Platform::Vercel,
        Platform::Generic,
    ];

    pub fn id(&self) -> &str {
        match self {
            Platform::Nginx => "nginx",
            Platform::Apache => "apache",
            Platform::NextJs => "nextjs",
            Platform::Express => "express",
            Platform::Netlify => "netlify",
            Platform::Vercel => "vercel",
            Platform::Generic => "generic",
            Platform::Other(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Platform::Nginx => "Nginx",
            Platform::Apache => "Apache",
            Platform::NextJs => "Next.js",
            Platform::Express => "Express",
            Platform::Netlify => "Netlify",
            Platform::Vercel => "Vercel",
            Platform::Generic => "Generic",
            Platform::Other(name) => name,
        }
    }

    /// Repository-relative path the patch is written to.
    pub fn default_config_file(&self) -> String {
        match self {
            Platform::Nginx => "security-headers.conf".to_string(),
            Platform::Apache => ".htaccess".to_string(),
            Platform::NextJs => "next.config.js".to_string(),
            Platform::Express => "security-headers.js".to_string(),
            Platform::Netlify => "_headers".to_string(),
            Platform::Vercel => "vercel.json".to_string(),
            Platform::Generic => "SECURITY_HEADERS.txt".to_string(),
            Platform::Other(name) => format!("SECURITY_HEADERS.{}.txt", name),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = Infallible;

    /// Never fails: unknown names become `Other` and get the generic rendering.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "nginx" => Platform::Nginx,
            "apache" | "httpd" | "htaccess" => Platform::Apache,
            "nextjs" | "next" | "next.js" => Platform::NextJs,
            "express" | "expressjs" => Platform::Express,
            "netlify" => Platform::Netlify,
            "vercel" => Platform::Vercel,
            "generic" => Platform::Generic,
            _ => Platform::Other(lower),
        })
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Platform::Generic))
    }
}

/// Descriptor of one platform's config file in the target repository.
/// Content is supplied by the caller; the engine never reads files itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkConfig {
    pub platform: Platform,
    pub config_file: String,
    pub exists: bool,
    pub content: Option<String>,
}

impl FrameworkConfig {
    /// A config that does not exist yet.
    pub fn new(platform: Platform) -> Self {
        Self {
            config_file: platform.default_config_file(),
            platform,
            exists: false,
            content: None,
        }
    }

    pub fn with_content(platform: Platform, content: impl Into<String>) -> Self {
        Self {
            config_file: platform.default_config_file(),
            platform,
            exists: true,
            content: Some(content.into()),
        }
    }

    /// Existing content, if any and not blank.
    pub fn existing(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_and_unknown() {
        assert_eq!("Next.js".parse::<Platform>().unwrap(), Platform::NextJs);
        assert_eq!("NGINX".parse::<Platform>().unwrap(), Platform::Nginx);
        assert_eq!("caddy".parse::<Platform>().unwrap(), Platform::Other("caddy".into()));
    }

    #[test]
    fn serializes_as_id() {
        assert_eq!(serde_json::to_string(&Platform::Vercel).unwrap(), "\"vercel\"");
        let p: Platform = serde_json::from_str("\"caddy\"").unwrap();
        assert_eq!(p, Platform::Other("caddy".into()));
    }

    #[test]
    fn blank_content_is_not_existing() {
        let cfg = FrameworkConfig::with_content(Platform::Vercel, "  \n");
        assert!(cfg.existing().is_none());
        assert_eq!(cfg.config_file, "vercel.json");
    }
}
