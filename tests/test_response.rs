use porthole::http::response::{
    BAD_REQUEST_BODY, NOT_FOUND_BODY, Response, ResponseBuilder, StatusCode,
};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_line_table() {
    assert_eq!(StatusCode::Ok.status_line(), "200 OK");
    assert_eq!(StatusCode::BadRequest.status_line(), "400 Bad Request");
    assert_eq!(StatusCode::Forbidden.status_line(), "403 Forbidden");
    assert_eq!(StatusCode::NotFound.status_line(), "404 Not Found");
    assert_eq!(
        StatusCode::InternalServerError.status_line(),
        "500 Internal Server Error"
    );
}

#[test]
fn test_status_code_from_u16() {
    assert_eq!(StatusCode::from_u16(403), Some(StatusCode::Forbidden));
    assert_eq!(StatusCode::from_u16(201), None);
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    assert_eq!(response.header("Content-Length").unwrap(), body.len().to_string());
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.header("Content-Length").unwrap(), "999");
}

#[test]
fn test_response_builder_empty_version_keeps_default() {
    let response = ResponseBuilder::new(StatusCode::Ok).version("").build();

    assert_eq!(response.version(), "HTTP/1.1");
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert!(response.body().is_empty());
    assert_eq!(response.header("Content-Length").unwrap(), "0");
}

#[test]
fn test_response_not_found_helper() {
    let response = Response::not_found("HTTP/1.0");

    assert_eq!(response.status(), StatusCode::NotFound);
    assert_eq!(response.version(), "HTTP/1.0");
    assert_eq!(response.body(), NOT_FOUND_BODY.as_bytes());
    assert_eq!(response.header("Content-Type").unwrap(), "text/html");
    assert_eq!(
        response.header("Content-Length").unwrap(),
        NOT_FOUND_BODY.len().to_string()
    );
}

#[test]
fn test_response_bad_request_helper() {
    let response = Response::bad_request("HTTP/1.1");

    assert_eq!(response.status(), StatusCode::BadRequest);
    assert_eq!(response.body(), BAD_REQUEST_BODY.as_bytes());
}

#[test]
fn test_response_internal_error_helper() {
    let response = Response::internal_error("HTTP/1.1");

    assert_eq!(response.status(), StatusCode::InternalServerError);
    assert_eq!(response.header("Content-Type").unwrap(), "text/html");
}
