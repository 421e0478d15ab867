use crate::fixes::platform::Platform;

use super::evaluator::lookup;
use super::HeaderMap;

/// Best-effort guess of the serving platform from response headers.
/// Framework hints win over hosting hints, which win over the server banner.
pub fn detect_platform(headers: &HeaderMap) -> Option<Platform> {
    let powered_by = lookup(headers, "x-powered-by").unwrap_or_default().to_ascii_lowercase();
    let server = lookup(headers, "server").unwrap_or_default().to_ascii_lowercase();

    // Next.js
    if powered_by.contains("next.js")
        || lookup(headers, "x-nextjs-cache").is_some()
        || lookup(headers, "x-nextjs-page").is_some()
        || lookup(headers, "x-nextjs-prerender").is_some()
    {
        return Some(Platform::NextJs);
    }

    // Express
    if powered_by.contains("express") {
        return Some(Platform::Express);
    }

    // Vercel
    if lookup(headers, "x-vercel-id").is_some() || lookup(headers, "x-vercel-cache").is_some() || server == "vercel" {
        return Some(Platform::Vercel);
    }

    // Netlify
    if lookup(headers, "x-nf-request-id").is_some() || server.contains("netlify") {
        return Some(Platform::Netlify);
    }

    if server.contains("nginx") || server.contains("openresty") {
        return Some(Platform::Nginx);
    }
    if server.contains("apache") {
        return Some(Platform::Apache);
    }

    None
}
