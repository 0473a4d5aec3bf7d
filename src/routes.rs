//! Client-side routes and the worksheet name resolver.

use std::fmt;

use crate::gateway::{GatewayError, RestClient};
use crate::model::WorksheetSummary;
use crate::terminal::is_full_uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Worksheet(String),
    /// `/worksheets/?name=<n>`; resolved to [`Route::Worksheet`] before display.
    WorksheetByName(String),
    Bundle(String),
    Login,
    Signup,
    SignupSuccess,
}

impl Route {
    /// Parses a path such as `/worksheets/0x1234/` or `/worksheets/?name=home`.
    /// Trailing slashes are optional.
    pub fn parse(path: &str) -> Option<Route> {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Home),
            ["worksheets"] => query_param(query?, "name")
                .filter(|n| !n.is_empty())
                .map(|n| Route::WorksheetByName(n.to_string())),
            ["worksheets", uuid] => Some(Route::Worksheet(uuid.to_string())),
            ["bundles", uuid] => Some(Route::Bundle(uuid.to_string())),
            ["account", "login"] => Some(Route::Login),
            ["account", "signup"] => Some(Route::Signup),
            ["account", "signup", "success"] => Some(Route::SignupSuccess),
            _ => None,
        }
    }

    /// Route for a worksheet given by full uuid or by name.
    pub fn for_worksheet(spec: &str) -> Route {
        if is_full_uuid(spec) {
            Route::Worksheet(spec.to_string())
        } else {
            Route::WorksheetByName(spec.to_string())
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Worksheet(uuid) => format!("/worksheets/{}/", uuid),
            Route::WorksheetByName(name) => format!("/worksheets/?name={}", name),
            Route::Bundle(uuid) => format!("/bundles/{}/", uuid),
            Route::Login => "/account/login".to_string(),
            Route::Signup => "/account/signup".to_string(),
            Route::SignupSuccess => "/account/signup/success".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Outcome of resolving a route that may need a server lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolved {
    Redirect(Route),
    /// Rendered as the neutral `Error.` placeholder.
    Error,
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Redirect(route) => write!(f, "{}", route),
            Resolved::Error => f.write_str("Error."),
        }
    }
}

/// Resolves name routes through `lookup`; every other route passes through.
pub fn resolve_with(
    route: Route,
    lookup: impl FnOnce(&str) -> Result<Option<WorksheetSummary>, GatewayError>,
) -> Resolved {
    let Route::WorksheetByName(name) = route else {
        return Resolved::Redirect(route);
    };
    match lookup(&name) {
        Ok(Some(found)) => {
            tracing::info!(name = %name, uuid = %found.id, "resolved worksheet name");
            Resolved::Redirect(Route::Worksheet(found.id))
        }
        Ok(None) => {
            tracing::warn!(name = %name, "no worksheet with that name");
            Resolved::Error
        }
        Err(err) => {
            tracing::warn!(name = %name, status = err.status, error = %err, "worksheet lookup failed");
            Resolved::Error
        }
    }
}

pub fn resolve(client: &RestClient, route: Route) -> Resolved {
    resolve_with(route, |name| client.resolve_worksheet(name))
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
