use maud::{html, Markup, DOCTYPE};

/// Landing page listing the available API routes
pub fn home_page(api_base: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Climate API" }
            }
            body {
                h1 { "Welcome to the Climate API!" }
                p { "Available routes:" }
                ul {
                    li { a href={(api_base) "/api/v1.0/precipitation"} { "/api/v1.0/precipitation" } }
                    li { a href={(api_base) "/api/v1.0/stations"} { "/api/v1.0/stations" } }
                    li { a href={(api_base) "/api/v1.0/tobs"} { "/api/v1.0/tobs" } }
                    li { "/api/v1.0/{start_date}" }
                    li { "/api/v1.0/{start_date}/{end_date}" }
                    li { "/api/v1.0/datesearch/{start_date}" }
                    li { "/api/v1.0/datesearch/{start_date}/{end_date}" }
                }
                p {
                    a href={(api_base) "/docs"} { "API docs" }
                }
            }
        }
    }
}
