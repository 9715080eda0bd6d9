pub const LANDING: &str = "/";

pub const PUBLIC_ROUTES: [&str; 8] = [
    "/",
    "/login",
    "/signup",
    "/contact-sales",
    "/verify-email",
    "/accept-invitation",
    "/privacy-policy",
    "/terms-of-service",
];

pub const DASHBOARD_ROUTES: [&str; 5] = [
    "/dashboard",
    "/dashboard/upgrade",
    "/dashboard/payment",
    "/dashboard/payment-success",
    "/dashboard/oauth/callback",
];

/// Where a request for `path` should be sent instead, if anywhere.
pub fn guard(path: &str, authenticated: bool) -> Option<&'static str> {
    let protected = path == "/dashboard" || path.starts_with("/dashboard/");
    (protected && !authenticated).then_some(LANDING)
}
