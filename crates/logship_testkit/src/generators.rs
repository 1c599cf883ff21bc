//! Property-based test generators using proptest.

use logship_codec::DeliveryResult;
use logship_collector::LogUploadProperties;
use proptest::prelude::*;

/// Strategy for a single record payload. Never empty.
pub fn record_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=96)
}

/// Strategy for a batch of record payloads.
pub fn record_batch_strategy(max_records: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(record_payload_strategy(), 0..=max_records)
}

/// Strategy for bucket budgets, from too small for anything to several
/// records.
pub fn bucket_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![1usize..16, 16usize..256, 256usize..2048]
}

/// Strategy for valid upload properties.
pub fn upload_properties_strategy() -> impl Strategy<Value = LogUploadProperties> {
    (64usize..16 * 1024, bucket_size_strategy())
        .prop_map(|(volume, bucket)| LogUploadProperties::new(volume, bucket))
}

/// Strategy for delivery outcomes.
pub fn delivery_result_strategy() -> impl Strategy<Value = DeliveryResult> {
    prop_oneof![Just(DeliveryResult::Success), Just(DeliveryResult::Failure)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn payloads_are_never_empty() {
        let mut runner = TestRunner::default();
        for _ in 0..64 {
            let payload = record_payload_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(!payload.is_empty());
        }
    }

    #[test]
    fn generated_properties_are_valid() {
        let mut runner = TestRunner::default();
        for _ in 0..64 {
            let properties = upload_properties_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert!(properties.validate().is_ok());
        }
    }
}
