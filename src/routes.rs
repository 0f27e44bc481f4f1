//! Navigation surface of the admin client.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Teachers,
    Teaching,
    Courses,
    Exams,
    Settings,
    Profile,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Teachers,
        Route::Teaching,
        Route::Courses,
        Route::Exams,
        Route::Settings,
        Route::Profile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Teachers => "/teachers",
            Route::Teaching => "/teaching",
            Route::Courses => "/courses",
            Route::Exams => "/exams",
            Route::Settings => "/settings",
            Route::Profile => "/profile",
        }
    }

    pub fn requires_auth(self) -> bool {
        self != Route::Login
    }

    fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(Route),
}

impl Resolution {
    /// The route that ends up on screen.
    pub fn target(self) -> Route {
        match self {
            Resolution::Render(r) | Resolution::Redirect(r) => r,
        }
    }
}

/// Resolves a path. `/`, `/dashboard` and unknown paths go to `/teachers`;
/// protected routes without a session go to `/login`.
pub fn resolve(path: &str, authenticated: bool) -> Resolution {
    let normalized = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };

    let (route, redirected) = match Route::from_path(normalized) {
        Some(route) => (route, false),
        None => (Route::Teachers, true),
    };

    if route.requires_auth() && !authenticated {
        return Resolution::Redirect(Route::Login);
    }
    if redirected {
        Resolution::Redirect(route)
    } else {
        Resolution::Render(route)
    }
}
