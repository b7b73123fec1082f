#![no_main]
use libfuzzer_sys::fuzz_target;
use oxizstd::io::read_coder_props;
use oxizstd::params::{CODER_PROPS_SIZE, CoderProps};

fuzz_target!(|data: &[u8]| {
    match CoderProps::from_bytes(data) {
        Ok(props) => {
            assert_eq!(data.len(), CODER_PROPS_SIZE);
            assert_eq!(&props.to_bytes()[..], data);
        }
        Err(_) => assert_ne!(data.len(), CODER_PROPS_SIZE),
    }

    let mut cursor = data;
    if let Ok(props) = read_coder_props(&mut cursor) {
        assert_eq!(cursor.len(), data.len() - CODER_PROPS_SIZE);
        assert_eq!(props.level, data[2]);
    }
});
