#![no_main]

use libfuzzer_sys::fuzz_target;
use derschema::{DecodeContext, Schema};

fuzz_target!(|data: &[u8]| {
    let schema = Schema::integer();
    if let Ok(value) = schema.decode_all(data, &DecodeContext::new()) {
        assert_eq!(value.encode().unwrap(), data);
    }
    if let Ok(value) = schema.decode_all(data, &DecodeContext::ber()) {
        let int = value.as_integer().unwrap();
        assert_eq!(
            derschema::int::decode_content(
                &derschema::int::encode_content(int)
            ).unwrap(),
            *int
        );
    }

    let _ = Schema::enumerated(&[("a", 0), ("b", 1)]).decode(
        data, &DecodeContext::ber()
    );
    let _ = Schema::integer().value_bounds(-128, 127).decode(
        data, &DecodeContext::new()
    );
});
