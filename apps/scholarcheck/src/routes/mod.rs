use std::fmt;
use std::str::FromStr;

/// Navigation targets. Every flow resolves to exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CheckForm,
    Result,
    Detail(String),
    Login,
    AuthCallback,
    MyPage,
    AdminLogin,
    Admin,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::CheckForm => "/".to_string(),
            Route::Result => "/result".to_string(),
            Route::Detail(id) => format!("/scholarship/{id}"),
            Route::Login => "/login".to_string(),
            Route::AuthCallback => "/auth/callback".to_string(),
            Route::MyPage => "/mypage".to_string(),
            Route::AdminLogin => "/admin/login".to_string(),
            Route::Admin => "/admin".to_string(),
        }
    }

    /// The command that opens this view.
    pub fn command(&self) -> String {
        match self {
            Route::CheckForm => "check --status <enrolled|expected|leave> --grade <1-4> \
                                 --birth-year <1996-2010> --gpa <0.0-4.5> --income <1-10>"
                .to_string(),
            Route::Result => "result".to_string(),
            Route::Detail(id) => format!("detail {id}"),
            Route::Login | Route::AuthCallback => "login <kakao|naver|google>".to_string(),
            Route::MyPage => "me".to_string(),
            Route::AdminLogin => "admin login --username <name>".to_string(),
            Route::Admin => "admin dashboard".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route: {0}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.split('?').next().unwrap_or_default().trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] | ["check"] => Ok(Route::CheckForm),
            ["result"] => Ok(Route::Result),
            ["scholarship", id] => Ok(Route::Detail((*id).to_string())),
            ["login"] => Ok(Route::Login),
            ["auth", "callback"] => Ok(Route::AuthCallback),
            ["mypage"] => Ok(Route::MyPage),
            ["admin", "login"] => Ok(Route::AdminLogin),
            ["admin"] => Ok(Route::Admin),
            _ => Err(UnknownRoute(s.to_string())),
        }
    }
}
