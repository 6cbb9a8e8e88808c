#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use hatchery_core::art::render;
use hatchery_core::stage::stage_for;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok((profile_id, score)) = <(u64, u64)>::arbitrary(&mut u) else {
        return;
    };

    let first = render(profile_id, score);
    let second = render(profile_id, score);
    assert_eq!(first.svg_markup, second.svg_markup);
    assert_eq!(first.image_data_uri, second.image_data_uri);

    let (idx, stage) = stage_for(score);
    assert_eq!(first.stage_index, idx);
    assert_eq!(first.stage_name, stage.name);
    assert!(first.svg_markup.starts_with("<svg"));
    assert!(first.svg_markup.ends_with("</svg>"));
});
