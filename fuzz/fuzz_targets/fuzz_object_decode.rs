#![no_main]

use libfuzzer_sys::fuzz_target;
use std::any::Any;

use gridcache_core::serialization::{
    DataSerializable, DecodeOutcome, ObjectCodec, ObjectReader, ObjectWriter, TypeId, TypeRegistry,
};
use gridcache_core::Result;

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
struct FuzzPosition {
    symbol: String,
    shares: i64,
}

impl DataSerializable for FuzzPosition {
    fn type_id(&self) -> TypeId {
        41
    }

    fn type_name(&self) -> &'static str {
        "FuzzPosition"
    }

    fn write_data(&self, output: &mut ObjectWriter<'_>) -> Result<()> {
        output.write_string(&self.symbol)?;
        output.write_long(self.shares)
    }

    fn read_data(&mut self, input: &mut ObjectReader<'_, '_>) -> Result<()> {
        self.symbol = input.read_string()?;
        self.shares = input.read_long()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
struct FuzzPortfolio {
    owner: String,
    active: bool,
    positions: Vec<FuzzPosition>,
}

impl DataSerializable for FuzzPortfolio {
    fn type_id(&self) -> TypeId {
        42
    }

    fn type_name(&self) -> &'static str {
        "FuzzPortfolio"
    }

    fn write_data(&self, output: &mut ObjectWriter<'_>) -> Result<()> {
        output.write_string(&self.owner)?;
        output.write_bool(self.active)?;
        output.write_object_list(&self.positions)
    }

    fn read_data(&mut self, input: &mut ObjectReader<'_, '_>) -> Result<()> {
        self.owner = input.read_string()?;
        self.active = input.read_bool()?;
        self.positions = input.read_object_list_as::<FuzzPosition>()?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

fuzz_target!(|data: &[u8]| {
    let registry = TypeRegistry::new();
    registry.register::<FuzzPosition>(41).unwrap();
    registry.register::<FuzzPortfolio>(42).unwrap();
    let codec = ObjectCodec::new(&registry);

    if let Ok(outcome) = codec.decode(data) {
        match outcome {
            DecodeOutcome::Decoded(obj) => {
                let _ = obj.type_id();
                let _ = obj.type_name();
            }
            DecodeOutcome::Unresolved(failure) => {
                let _ = failure.type_id;
                let _ = failure.raw_bytes.len();
                let _ = failure.partial_as::<FuzzPortfolio>();
            }
        }
    }
    let _ = codec.decode_as::<FuzzPortfolio>(data);
});
