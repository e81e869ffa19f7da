use yew::prelude::*;
use yew_router::prelude::*;

use crate::tools::piano::settings::PianoSettings;
use crate::tools::piano::PianoKeyboard;

// 애플리케이션의 라우트 정의
#[derive(Clone, Debug, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[not_found]
    #[at("/404")]
    NotFound,
}

// 네비게이션 바 컴포넌트
#[function_component(Navbar)]
pub fn navbar() -> Html {
    html! {
        <nav class="navbar">
            <div class="navbar-container">
                <Link<Route> classes={classes!("navbar-title")} to={Route::Home}>
                    {"Piano"}
                </Link<Route>>
            </div>
        </nav>
    }
}

// 피아노 페이지. URL 쿼리로 초기 옥타브/볼륨을 받는다 (예: /?octave=5&volume=-12)
#[function_component(PianoPage)]
pub fn piano_page() -> Html {
    let settings = use_location()
        .and_then(|location| location.query::<PianoSettings>().ok())
        .unwrap_or_default()
        .clamped();

    html! {
        <div class="detail-page">
            <div class="content">
                <PianoKeyboard settings={settings} />
            </div>
        </div>
    }
}

#[function_component(NotFound)]
pub fn not_found() -> Html {
    html! {
        <div>
            <Link<Route> to={Route::Home}>{"🏠 Back to Home"}</Link<Route>>
        </div>
    }
}

pub fn switch(route: Route) -> Html {
    let content = match route {
        Route::Home => html! { <PianoPage /> },
        Route::NotFound => html! { <NotFound /> },
    };

    html! {
        <>
            <Navbar />
            <div class="app-container">
                { content }
            </div>
        </>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::recognize("/"), Some(Route::Home));
        assert_eq!(Route::Home.to_path(), "/");
        assert_eq!(Route::recognize("/missing"), Some(Route::NotFound));
    }
}
