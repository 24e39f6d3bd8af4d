#![no_main]

use libfuzzer_sys::fuzz_target;

use gridcache_core::serialization::{ObjectCodec, StructInstance, TypeRegistry};

fuzz_target!(|data: &[u8]| {
    let registry = TypeRegistry::new();
    let codec = ObjectCodec::new(&registry);

    if let Ok(instance) = codec.decode_as::<StructInstance>(data) {
        let _ = instance.field_count();
        let _ = instance.is_empty();

        let names: Vec<String> = instance.field_names().map(String::from).collect();
        for name in &names {
            let _ = instance.has_field(name);
            let _ = instance.read(name);
        }

        // a decoded instance must equal itself structurally
        assert_eq!(instance, instance.clone());
    }
});
