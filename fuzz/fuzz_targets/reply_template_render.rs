#![no_main]

use herald_external_service::render_reply_template;
use libfuzzer_sys::fuzz_target;
use serde_json::{json, Map, Value};

fuzz_target!(|data: &[u8]| {
    let template = String::from_utf8_lossy(data);
    let mut fields = Map::new();
    fields.insert("result".to_string(), json!("passed"));
    fields.insert("coverage".to_string(), json!(99));
    fields.insert("empty".to_string(), Value::Null);

    let rendered = render_reply_template(&template, &fields);
    if !template.contains("{{") {
        assert_eq!(rendered, template);
    }
});
