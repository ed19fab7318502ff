#![no_main]

use herald_external_service::service_response::render_plain_reply;
use herald_external_service::{parse_response_body, ParsedBody};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let parsed = parse_response_body(&body);
    match &parsed {
        ParsedBody::Unparseable => assert!(parsed.fields().is_none()),
        ParsedBody::ArrayFirstText(_) => {
            let fields = parsed.fields().expect("wrapped fields");
            assert_eq!(fields.len(), 1);
            assert!(fields.contains_key("response"));
        }
        ParsedBody::EmptyArray => {
            assert_eq!(parsed.fields().map(|fields| fields.len()), Some(0));
            assert!(render_plain_reply(&body).is_empty());
        }
        ParsedBody::JsonObject(_) | ParsedBody::ArrayFirstObject(_) => {
            assert!(parsed.fields().is_some());
        }
    }
    assert_eq!(parse_response_body(&body), parsed);
    let _ = render_plain_reply(&body);
});
