use std::collections::HashMap;

use crate::config::RouteConfig;
use crate::http::mime::FileType;

/// Path of the login form endpoint in the built-in table.
pub const LOGIN_PATH: &str = "/dopost";

/// What a path resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub file_type: FileType,
    /// Asset locator handed to the [`crate::dispatch::AssetSource`]; empty
    /// for synthetic endpoints.
    pub locator: String,
    /// Synthetic endpoint that only answers POST.
    pub post_only: bool,
}

impl Route {
    pub fn file(file_type: FileType, locator: impl Into<String>) -> Self {
        Self {
            file_type,
            locator: locator.into(),
            post_only: false,
        }
    }

    pub fn post_endpoint() -> Self {
        Self {
            file_type: FileType::Html,
            locator: String::new(),
            post_only: true,
        }
    }
}

/// Static path → route mapping. Read-only once the server is built.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The site served when no routes are configured.
    pub fn site_default() -> Self {
        let mut table = Self::new();
        table.insert("/", Route::file(FileType::Html, "html/test.html"));
        table.insert("/test.html", Route::file(FileType::Html, "html/test.html"));
        table.insert("/noimg.html", Route::file(FileType::Html, "html/noimg.html"));
        table.insert("/txt/test.txt", Route::file(FileType::Txt, "txt/test.txt"));
        table.insert("/img/logo.jpg", Route::file(FileType::Jpg, "img/logo.jpg"));
        table.insert("/favicon.ico", Route::file(FileType::Ico, "img/favicon.ico"));
        table.insert(LOGIN_PATH, Route::post_endpoint());
        table
    }

    /// Builds a table from configuration, falling back to
    /// [`RouteTable::site_default`] when the list is empty.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        if routes.is_empty() {
            return Self::site_default();
        }

        let mut table = Self::new();
        for route in routes {
            table.insert(
                route.path.clone(),
                Route {
                    file_type: route.file_type,
                    locator: route.file.clone(),
                    post_only: route.post_only,
                },
            );
        }
        table
    }

    pub fn insert(&mut self, path: impl Into<String>, route: Route) -> Option<Route> {
        self.routes.insert(path.into(), route)
    }

    pub fn get(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
