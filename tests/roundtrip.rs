//! Round-trip tests for the bundled codecs, plus property-based coverage
//! with proptest.

use std::io::Cursor;

use imageio::{
    Error, FormatSelector, Image, Image2D, Image3D, ImageSource, PixelType, Registry, Strict,
};
use proptest::prelude::*;

#[test]
fn pgm_u8_roundtrips_through_detection() {
    let registry = Registry::with_defaults();
    let mut image = Image2D::<u8>::with_shape([16, 9]);
    for (i, sample) in image.data_mut().iter_mut().enumerate() {
        *sample = (i * 7 % 256) as u8;
    }

    let mut bytes = Vec::new();
    registry.write_as("pgm", &mut bytes, &image).unwrap();

    let mut source = ImageSource::new(Cursor::new(bytes));
    let decoded = registry.read_new(&mut source).unwrap();
    assert_eq!(decoded.format_tag(), Some("pgm"));
    assert_eq!(decoded.pixel_type(), PixelType::U8);
    assert_eq!(decoded.shape(), image.shape());
    assert_eq!(decoded.as_bytes(), image.as_bytes());
}

#[test]
fn pgm_u16_roundtrips_with_big_endian_payload() {
    let registry = Registry::with_defaults();
    let mut image = Image2D::<u16>::with_shape([8, 5]);
    for (i, sample) in image.data_mut().iter_mut().enumerate() {
        *sample = (i * 1021) as u16;
    }

    let mut bytes = Vec::new();
    registry.write_as("pgm", &mut bytes, &image).unwrap();

    let mut source = ImageSource::new(Cursor::new(bytes));
    let decoded = registry.read_new(&mut source).unwrap();
    assert_eq!(decoded.pixel_type(), PixelType::U16);
    let decoded = decoded
        .as_any()
        .downcast_ref::<Image2D<u16>>()
        .expect("detected image has the declared concrete type");
    assert_eq!(decoded.data(), image.data());
}

#[test]
fn inr_f32_3d_roundtrips_byte_identical() {
    let registry = Registry::with_defaults();
    let mut image = Image3D::<f32>::with_shape([7, 5, 3]);
    for (i, sample) in image.data_mut().iter_mut().enumerate() {
        *sample = i as f32 * 0.25 - 10.0;
    }

    let mut bytes = Vec::new();
    registry.write_as("inr", &mut bytes, &image).unwrap();

    let mut source = ImageSource::new(Cursor::new(bytes.clone()));
    let decoded = registry.read_new(&mut source).unwrap();
    assert_eq!(decoded.format_tag(), Some("inr"));
    assert_eq!(decoded.pixel_type(), PixelType::F32);
    assert_eq!(decoded.dimension(), 3);
    assert_eq!(decoded.shape(), &[7, 5, 3]);
    assert_eq!(decoded.as_bytes(), image.as_bytes());

    // Writing the detected image back, routed by its tag, reproduces the
    // file byte for byte.
    let mut again = Vec::new();
    registry.write(&mut again, decoded.as_ref()).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn inr_normalizes_foreign_byte_order() {
    let registry = Registry::with_defaults();
    let mut image = Image2D::<u16>::with_shape([6, 4]);
    for (i, sample) in image.data_mut().iter_mut().enumerate() {
        *sample = 0x0100 + i as u16;
    }

    let mut bytes = Vec::new();
    registry.write_as("inr", &mut bytes, &image).unwrap();

    // Rewrite the file as its byte-swapped foreign-endian twin: flip the
    // CPU key (same byte length) and swap every sample pair.
    let header_len = bytes.len() - image.as_bytes().len();
    let text = String::from_utf8(bytes[..header_len].to_vec()).unwrap();
    let foreign_text = if text.contains("CPU=decm") {
        text.replacen("CPU=decm\n", "CPU=sun\n\n", 1)
    } else {
        text.replacen("CPU=sun\n", "CPU=pc\n\n", 1)
    };
    let mut foreign = foreign_text.into_bytes();
    for pair in bytes[header_len..].chunks_exact(2) {
        foreign.push(pair[1]);
        foreign.push(pair[0]);
    }

    let mut source = ImageSource::new(Cursor::new(foreign));
    let decoded = registry.read_new(&mut source).unwrap();
    let decoded = decoded.as_any().downcast_ref::<Image2D<u16>>().unwrap();
    assert_eq!(decoded.data(), image.data());
}

#[test]
fn strict_read_into_matching_pgm_destination() {
    let registry = Registry::with_defaults();
    let mut image = Image2D::<u8>::with_shape([10, 4]);
    for (i, sample) in image.data_mut().iter_mut().enumerate() {
        *sample = i as u8;
    }
    let mut bytes = Vec::new();
    registry.write_as("pgm", &mut bytes, &image).unwrap();

    let mut dest = Image2D::<u8>::new();
    let mut source = ImageSource::new(Cursor::new(bytes));
    registry
        .read(&mut source, &mut Strict(&mut dest))
        .unwrap();
    assert_eq!(dest.shape(), &[10, 4]);
    assert_eq!(dest.data(), image.data());
    assert_eq!(dest.format_tag(), Some("pgm"));
}

#[test]
fn pgm_file_read_into_strict_inr_typed_destination_fails() {
    let registry = Registry::with_defaults();
    let image = Image2D::<u8>::with_shape([10, 4]);
    let mut bytes = Vec::new();
    registry.write_as("pgm", &mut bytes, &image).unwrap();

    // The file is 2-D u8; a 3-D destination must be refused.
    let mut dest = Image3D::<u8>::new();
    let mut source = ImageSource::new(Cursor::new(bytes));
    assert!(matches!(
        registry.read(&mut source, &mut Strict(&mut dest)),
        Err(Error::BadDimension {
            expected: 3,
            declared: 2
        })
    ));
}

#[test]
fn suffix_override_pins_the_bundled_codec() {
    let registry = Registry::with_defaults();
    assert_eq!(registry.formats(), vec!["pgm", "inr"]);

    let image = Image2D::<u8>::with_shape([8, 8]);
    let mut bytes = Vec::new();
    registry.write_as("pgm", &mut bytes, &image).unwrap();

    registry
        .set_format(FormatSelector::Suffix("scan.pgm"), false)
        .unwrap();
    let mut source = ImageSource::new(Cursor::new(bytes));
    let decoded = registry.read_new(&mut source).unwrap();
    assert_eq!(decoded.format_tag(), Some("pgm"));
}

#[test]
fn zero_extent_images_are_refused_on_write() {
    // Neither codec can represent an empty image; its own parser would
    // reject the resulting header.
    let registry = Registry::with_defaults();
    let flat = Image2D::<u8>::with_shape([0, 5]);
    let mut out = Vec::new();
    assert!(matches!(
        registry.write_as("pgm", &mut out, &flat),
        Err(Error::NonMatchingFormatOnWrite { format: "pgm" })
    ));
    assert!(matches!(
        registry.write_as("inr", &mut out, &flat),
        Err(Error::NonMatchingFormatOnWrite { format: "inr" })
    ));
    assert!(out.is_empty());
}

#[test]
fn default_registry_resolves_bundled_suffixes() {
    let registry = Registry::with_defaults();
    assert_eq!(registry.by_suffix("a.pgm").unwrap().identity(), "pgm");
    assert_eq!(registry.by_suffix("b.inr").unwrap().identity(), "inr");
    assert!(matches!(
        registry.by_suffix("image.xyz"),
        Err(Error::UnknownFileSuffix { .. })
    ));
    assert!(matches!(
        registry.by_suffix("noext"),
        Err(Error::NoSuffixInName { .. })
    ));
}

proptest! {
    /// Any 2-D u8 image survives a PGM write/read cycle with identical
    /// shape and samples. Extents are kept above the sniff-prefix floor.
    #[test]
    fn pgm_roundtrip_preserves_arbitrary_u8_images(
        width in 8usize..=32,
        height in 4usize..=16,
        seed in any::<u64>(),
    ) {
        let registry = Registry::with_defaults();
        let mut image = Image2D::<u8>::with_shape([width, height]);
        let mut state = seed;
        for sample in image.data_mut() {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            *sample = state as u8;
        }

        let mut bytes = Vec::new();
        registry.write_as("pgm", &mut bytes, &image).unwrap();
        let mut source = ImageSource::new(Cursor::new(bytes));
        let decoded = registry.read_new(&mut source).unwrap();

        prop_assert_eq!(decoded.pixel_type(), PixelType::U8);
        prop_assert_eq!(decoded.shape(), image.shape());
        prop_assert_eq!(decoded.as_bytes(), image.as_bytes());
    }

    /// A 3-D i32 image survives an Inrimage cycle for arbitrary extents.
    #[test]
    fn inr_roundtrip_preserves_arbitrary_i32_volumes(
        dx in 1usize..=8,
        dy in 2usize..=8,
        dz in 2usize..=6,
        seed in any::<i32>(),
    ) {
        let registry = Registry::with_defaults();
        let mut image = Image3D::<i32>::with_shape([dx, dy, dz]);
        for (i, sample) in image.data_mut().iter_mut().enumerate() {
            *sample = seed.wrapping_add(i as i32).wrapping_mul(2654435761u32 as i32);
        }

        let mut bytes = Vec::new();
        registry.write_as("inr", &mut bytes, &image).unwrap();
        let mut source = ImageSource::new(Cursor::new(bytes));
        let decoded = registry.read_new(&mut source).unwrap();

        prop_assert_eq!(decoded.pixel_type(), PixelType::I32);
        prop_assert_eq!(decoded.shape(), image.shape());
        prop_assert_eq!(decoded.as_bytes(), image.as_bytes());
    }
}
