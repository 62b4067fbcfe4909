#![no_main]

use libfuzzer_sys::fuzz_target;
use derschema::{DecodeContext, Oid, Schema};

fuzz_target!(|data: &[u8]| {
    let take = Schema::object_identifier().decode_all(
        data, &DecodeContext::new()
    );
    if let Ok(value) = take.as_ref() {
        assert_eq!(value.encode().unwrap(), data);
        let oid = value.as_oid().unwrap();
        let parsed: Oid = oid.to_string().parse().unwrap();
        assert_eq!(&parsed, oid);
    }

    let content = Oid::decode_content(data);
    if let Ok(oid) = content {
        assert_eq!(oid.encode_content(), data);
    }
});
