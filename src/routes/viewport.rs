use crate::layout::FooterLayout;
use crate::viewport::{classify_dimensions, Dimensions, ViewportState};
use actix_web::http::header::HeaderMap;
use actix_web::{web, HttpRequest, HttpResponse};

const WIDTH_HINTS: [&str; 2] = ["Sec-CH-Viewport-Width", "Viewport-Width"];
const HEIGHT_HINTS: [&str; 1] = ["Sec-CH-Viewport-Height"];

#[derive(serde::Deserialize)]
pub struct ViewportQuery {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(serde::Serialize)]
struct ViewportResponse {
    measured: bool,
    viewport: ViewportState,
    footer: FooterLayout,
}

fn header_hint(headers: &HeaderMap, names: &[&str]) -> Option<u32> {
    names.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    })
}

/// Server-side classification. Without a width hint the page is rendered
/// with the default state and corrected once the client measures.
pub async fn classify_viewport(
    request: HttpRequest,
    web::Query(query): web::Query<ViewportQuery>,
) -> HttpResponse {
    let headers = request.headers();
    let width = query.width.or_else(|| header_hint(headers, &WIDTH_HINTS));
    let viewport = match width {
        Some(width) => {
            let height = query
                .height
                .or_else(|| header_hint(headers, &HEIGHT_HINTS))
                .unwrap_or(0);
            classify_dimensions(Dimensions::new(width, height))
        }
        None => ViewportState::default(),
    };

    HttpResponse::Ok()
        // Ask the browser to send the hints on later requests
        .insert_header(("Accept-CH", "Sec-CH-Viewport-Width, Sec-CH-Viewport-Height"))
        .json(ViewportResponse {
            measured: width.is_some(),
            viewport,
            footer: FooterLayout::for_viewport(&viewport),
        })
}
