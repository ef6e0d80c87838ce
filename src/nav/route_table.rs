//! Static route table for the panel SPA.
//!
//! Routes are defined once at startup and never mutated. The table does not
//! render anything; each route carries an opaque component identifier that
//! the frontend resolves lazily. What matters to the backend is the shape:
//! paths, unique names, `requires_auth` flags, and nesting.

/// Identifier of a lazily-loaded view component. The server never resolves
/// these; they exist so the table mirrors the frontend's route records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Login,
    Home,
    Layout,
    DashboardMain,
    SettingsMain,
}

/// A single route record. Children are evaluated under their parent's
/// `requires_auth` flag.
#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub component: Component,
    pub requires_auth: bool,
    pub children: Vec<Route>,
}

impl Route {
    fn new(path: &'static str, name: &'static str, component: Component) -> Self {
        Self { path, name, component, requires_auth: false, children: Vec::new() }
    }

    fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    fn with_children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }
}

/// A target path resolved against the table, with its effective
/// `requires_auth` flag. Unknown paths resolve to an unguarded target so
/// the guard's fallback rule applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub path: String,
    pub name: Option<&'static str>,
    pub requires_auth: bool,
}

/// Build the SPA route table.
#[must_use]
pub fn route_table() -> Vec<Route> {
    vec![
        Route::new("/login", "Login", Component::Login),
        Route::new("/", "Home", Component::Home),
        Route::new("/dashboard", "Dashboard", Component::Layout)
            .requires_auth()
            .with_children(vec![Route::new("/dashboard", "DashboardMain", Component::DashboardMain)]),
        Route::new("/settings", "Settings", Component::Layout)
            .requires_auth()
            .with_children(vec![Route::new("/settings", "SettingsMain", Component::SettingsMain)]),
    ]
}

/// Resolve a path against the table. A child route inherits `requires_auth`
/// from any guarding ancestor.
#[must_use]
pub fn resolve(routes: &[Route], path: &str) -> ResolvedTarget {
    fn walk(routes: &[Route], path: &str, inherited_auth: bool) -> Option<(Option<&'static str>, bool)> {
        for route in routes {
            let guarded = inherited_auth || route.requires_auth;
            if route.path == path {
                return Some((Some(route.name), guarded));
            }
            if let Some(found) = walk(&route.children, path, guarded) {
                return Some(found);
            }
        }
        None
    }

    match walk(routes, path, false) {
        Some((name, requires_auth)) => ResolvedTarget { path: path.to_owned(), name, requires_auth },
        None => ResolvedTarget { path: path.to_owned(), name: None, requires_auth: false },
    }
}

#[cfg(test)]
#[path = "route_table_test.rs"]
mod tests;
