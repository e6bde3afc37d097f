#![no_main]

use libfuzzer_sys::fuzz_target;
use vx_types::{CommitmentContext, MessageContext, RevealContext};

// Context bytes arrive from the audit log and from oracle requests.
// Decoding must never panic, and anything that decodes must survive a
// re-encode.
fuzz_target!(|data: &[u8]| {
    let _ = CommitmentContext::decode(data);
    let _ = RevealContext::decode(data);

    if let Ok(context) = MessageContext::decode(data) {
        let bytes = context.encode().expect("decoded context re-encodes");
        let again = MessageContext::decode(&bytes).expect("re-encoded context decodes");
        assert_eq!(again.family(), context.family());
    }
});
