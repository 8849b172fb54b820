//! Page paths of the frontend shell.

use medlens_contracts::session::Role;

/// Builds page paths under a configurable frontend base such as `/frontend`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    base: String,
}

impl Routes {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn index(&self) -> String {
        format!("{}/index.html", self.base)
    }

    pub fn login(&self) -> String {
        format!("{}/auth/login.html", self.base)
    }

    /// The landing dashboard for `role`. Unknown roles land on the index.
    pub fn dashboard(&self, role: &Role) -> String {
        match role {
            Role::Doctor => format!("{}/modules/doctor/dashboard.html", self.base),
            Role::Patient => format!("{}/modules/patient/dashboard.html", self.base),
            Role::Admin => format!("{}/modules/admin/dashboard.html", self.base),
            Role::Other(_) => self.index(),
        }
    }

    /// True when `path` is one of the auth pages.
    pub fn is_auth_page(path: &str) -> bool {
        path.contains("auth/")
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new("/frontend")
    }
}
