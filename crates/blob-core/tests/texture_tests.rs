// Texture loading, sampling conventions and cube face lookup.

use blob_core::*;
use glam::{Vec2, Vec3, Vec4};
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("blob-core-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// 1x2 texture, red on top, blue on the bottom.
fn two_rows(sampler: SamplerDesc) -> Texture2D {
    Texture2D::from_rgba8(1, 2, &[255, 0, 0, 255, 0, 0, 255, 255], sampler).unwrap()
}

// ---------------- loading ----------------

#[test]
fn missing_texture_is_resource_not_found() {
    let path = scratch_dir("missing").join("nope.png");
    match Texture2D::load(&path, SamplerDesc::REPEAT_LINEAR) {
        Err(BlobError::ResourceNotFound(p)) => assert_eq!(p, path),
        other => panic!("expected ResourceNotFound, got {:?}", other.map(|t| t.size())),
    }
}

#[test]
fn undecodable_texture_is_reported() {
    let path = scratch_dir("garbage").join("garbage.png");
    std::fs::write(&path, b"not an image").unwrap();
    assert!(matches!(
        Texture2D::load(&path, SamplerDesc::REPEAT_LINEAR),
        Err(BlobError::TextureDecode { .. })
    ));
}

#[test]
fn saved_texture_loads_back() {
    let path = scratch_dir("roundtrip").join("rows.png");
    two_rows(SamplerDesc::CLAMP_LINEAR).to_rgba8().save(&path).unwrap();
    let tex = Texture2D::load(&path, SamplerDesc::CLAMP_LINEAR).unwrap();
    assert_eq!(tex.size(), (1, 2));
    assert_eq!(tex.texel(0, 0), RED);
    assert_eq!(tex.texel(0, 1), BLUE);
}

#[test]
fn rgba8_length_is_validated() {
    assert!(matches!(
        Texture2D::from_rgba8(2, 2, &[0; 15], SamplerDesc::CLAMP_LINEAR),
        Err(BlobError::InvalidTexture(_))
    ));
    assert!(matches!(
        Texture2D::from_rgba8(0, 2, &[], SamplerDesc::CLAMP_LINEAR),
        Err(BlobError::InvalidTexture(_))
    ));
}

// ---------------- sampling ----------------

#[test]
fn uv_origin_is_bottom_left() {
    let nearest = SamplerDesc {
        wrap: WrapMode::ClampToEdge,
        filter: FilterMode::Nearest,
    };
    let tex = two_rows(nearest);
    assert_eq!(tex.sample(Vec2::new(0.5, 0.25)), BLUE);
    assert_eq!(tex.sample(Vec2::new(0.5, 0.75)), RED);
}

#[test]
fn repeat_wraps_and_clamp_holds_edges() {
    let repeat = SamplerDesc {
        wrap: WrapMode::Repeat,
        filter: FilterMode::Nearest,
    };
    let tex = two_rows(repeat);
    assert_eq!(tex.sample(Vec2::new(3.5, 1.25)), tex.sample(Vec2::new(0.5, 0.25)));
    assert_eq!(tex.sample(Vec2::new(-0.5, -0.25)), tex.sample(Vec2::new(0.5, 0.75)));

    let clamp = two_rows(SamplerDesc {
        wrap: WrapMode::ClampToEdge,
        filter: FilterMode::Nearest,
    });
    assert_eq!(clamp.sample(Vec2::new(0.5, -4.0)), BLUE);
    assert_eq!(clamp.sample(Vec2::new(0.5, 9.0)), RED);
}

#[test]
fn linear_filter_blends_between_rows() {
    let tex = two_rows(SamplerDesc::CLAMP_LINEAR);
    let mid = tex.sample(Vec2::new(0.5, 0.5));
    assert!(mid.abs_diff_eq(Vec4::new(0.5, 0.0, 0.5, 1.0), 1e-6));
}

#[test]
fn reallocate_resizes_and_fills() {
    let mut tex = Texture2D::new(2, 2, Vec4::ONE, SamplerDesc::CLAMP_LINEAR);
    tex.reallocate(3, 1, Vec4::ZERO);
    assert_eq!(tex.size(), (3, 1));
    assert!(tex.texels().iter().all(|t| *t == Vec4::ZERO));
}

// ---------------- cube maps ----------------

#[test]
fn cube_face_selection_follows_major_axis() {
    let cases = [
        (Vec3::X, 0),
        (-Vec3::X, 1),
        (Vec3::Y, 2),
        (-Vec3::Y, 3),
        (Vec3::Z, 4),
        (-Vec3::Z, 5),
        (Vec3::new(0.2, -0.9, 0.3), 3),
    ];
    for (dir, face) in cases {
        let (f, s, t) = cube_face_coords(dir);
        assert_eq!(f, face, "{:?}", dir);
        assert!((0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t));
    }
    let (_, s, t) = cube_face_coords(Vec3::Z);
    assert_eq!((s, t), (0.5, 0.5));
}

#[test]
fn cubemap_samples_the_selected_face() {
    let colors = [RED, BLUE, Vec4::ONE, Vec4::ZERO, Vec4::new(0.0, 1.0, 0.0, 1.0), Vec4::splat(0.5)];
    let faces = colors.map(|c| Texture2D::solid(c, SamplerDesc::CLAMP_LINEAR));
    let cube = CubeMap::from_faces(faces).unwrap();
    assert_eq!(cube.sample(Vec3::new(1.0, 0.1, 0.1)), RED);
    assert_eq!(cube.sample(Vec3::new(0.1, 0.1, -1.0)), Vec4::splat(0.5));
}

#[test]
fn cubemap_faces_must_be_square_and_equal() {
    let mut faces: [Texture2D; 6] = std::array::from_fn(|_| Texture2D::new(2, 2, Vec4::ONE, SamplerDesc::CLAMP_LINEAR));
    faces[3] = Texture2D::new(4, 4, Vec4::ONE, SamplerDesc::CLAMP_LINEAR);
    assert!(matches!(CubeMap::from_faces(faces), Err(BlobError::InvalidCubemap(_))));

    let faces: [Texture2D; 6] = std::array::from_fn(|_| Texture2D::new(2, 1, Vec4::ONE, SamplerDesc::CLAMP_LINEAR));
    assert!(matches!(CubeMap::from_faces(faces), Err(BlobError::InvalidCubemap(_))));
}

#[test]
fn cubemap_with_missing_face_fails_fast() {
    let dir = scratch_dir("cube");
    let face = Texture2D::new(2, 2, Vec4::ONE, SamplerDesc::CLAMP_LINEAR).to_rgba8();
    for name in &CUBE_FACE_FILES[..5] {
        face.save(dir.join(name)).unwrap();
    }
    let _ = std::fs::remove_file(dir.join(CUBE_FACE_FILES[5]));
    let names = CUBE_FACE_FILES.map(String::from);
    match CubeMap::load(&dir, &names) {
        Err(BlobError::ResourceNotFound(p)) => assert!(p.ends_with(CUBE_FACE_FILES[5])),
        other => panic!("expected ResourceNotFound, got {:?}", other.map(|c| c.face_size())),
    }

    face.save(dir.join(CUBE_FACE_FILES[5])).unwrap();
    assert_eq!(CubeMap::load(&dir, &names).unwrap().face_size(), 2);
}
