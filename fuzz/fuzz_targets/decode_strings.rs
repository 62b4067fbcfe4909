#![no_main]

use libfuzzer_sys::fuzz_target;
use derschema::{DecodeContext, Schema};

fuzz_target!(|data: &[u8]| {
    for ctx in [DecodeContext::new(), DecodeContext::ber()] {
        if let Ok((value, _)) = Schema::bit_string().decode(data, &ctx) {
            let bits = value.as_bit_string().unwrap();
            assert!(bits.unused() < 8);
            assert!(bits.octet_len() > 0 || bits.unused() == 0);
        }

        let _ = Schema::octet_string().decode(data, &ctx);
        let _ = Schema::octet_string().optional().decode(data, &ctx);
        let _ = Schema::ia5_string().decode(data, &ctx);
        let _ = Schema::numeric_string().decode(data, &ctx);
        let _ = Schema::printable_string().decode(data, &ctx);
        let _ = Schema::utf8_string().decode(data, &ctx);
        let _ = Schema::bmp_string().decode(data, &ctx);

        if let Ok(value) = Schema::any().decode_all(data, &ctx) {
            assert_eq!(value.encode().unwrap(), data);
        }
    }
});
