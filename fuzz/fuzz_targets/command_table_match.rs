#![no_main]

use herald_commands::{CommandTable, EVENT_ISSUE_COMMENT_CREATED};
use herald_external_service::ServiceDescriptor;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let services = [ServiceDescriptor::new("tests", "run specs")];
    let Ok(table) = CommandTable::new("botsci", &services) else {
        return;
    };
    for (entry, matched) in table.matching(EVENT_ISSUE_COMMENT_CREATED, &text) {
        assert!(text.trim_start().starts_with('@'));
        let _ = table.plan(entry.kind(), &matched);
    }
    assert!(table.matching("issues.opened", &text).is_empty());
});
