pub const PATH_HEALTHZ: &str = "/healthz";
pub const PATH_EXECUTE: &str = "/graphql/execute";
pub const PATH_GRAPHQL: &str = "/graphql";
pub const PATH_WS: &str = "/ws";

/// Header carrying the caller's user id, set by the identity layer in front of us.
pub const HEADER_USER_ID: &str = "x-user-id";

pub const ERROR_CODE_VALIDATION: &str = "E_VALIDATION";
pub const ERROR_CODE_INTERNAL: &str = "E_INTERNAL";

/// Placeholder section routes and the detail each one answers with.
pub const SECTION_ROUTES: &[(&str, &str)] = &[
    ("/spec/", "Spec route"),
    ("/viz/", "Viz route"),
    ("/output/", "Output route"),
    ("/keys/", "Key route (tunneled)"),
];

/// Text sent back for every inbound WebSocket text frame.
#[must_use]
pub fn ws_echo(text: &str) -> String {
    format!("Message: {text}")
}
