#![no_main]
use libfuzzer_sys::fuzz_target;
use zentga::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 20),
        ..Default::default()
    };
    let Ok(decoded) = decode_with_limits(data, &limits, enough::Unstoppable) else {
        return;
    };

    for mode in TargetMode::ALL {
        let converted = convert(&decoded, mode).expect("valid mode");
        let encoded = encode(&converted, enough::Unstoppable).expect("encode of converted image");
        let Ok(again) = decode(&encoded, enough::Unstoppable) else {
            panic!("re-encoded {mode} failed to decode");
        };
        assert_eq!(decoded.width, again.width);
        assert_eq!(decoded.height, again.height);

        // 32-bit true-color and unquantized color maps are lossless
        let lossless = match converted.variant {
            ImageVariant::TrueColor(TrueColorDepth::Bits32) => true,
            ImageVariant::ColorMapped { .. } => !converted.is_quantized(),
            _ => false,
        };
        if lossless {
            assert_eq!(decoded.pixels(), again.pixels(), "mode {mode} lost pixels");
        }
    }
});
