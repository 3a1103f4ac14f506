// Common test utilities: synthetic model builders.

use car_tools_lib::math::DfVector3;
use car_tools_lib::model::car::{CarAnimation, CarSound, CrossRefTable};
use car_tools_lib::model::records::{Bone, Face, Vertex};
use car_tools_lib::{Model, PackedTexture};

/// A quad (two triangles) with a two-bone chain and a small texture.
pub fn rigged_quad() -> Model {
    let mut model = Model::default();

    model.vertices = vec![
        vertex(0.0, 0.0, 0.0, 0),
        vertex(1.0, 0.0, 0.0, 0),
        vertex(1.0, 1.0, 0.0, 1),
        vertex(0.0, 1.0, 0.0, 1),
    ];

    model.faces = vec![
        face([0, 1, 2], [0, 255, 255], [0, 0, 31], 0x0001),
        face([0, 2, 3], [0, 255, 0], [0, 31, 31], 0x8000),
    ];

    model.bones = vec![
        bone("Root", 0.0, 0.0, 0.0, -1),
        bone("Tip", 0.0, 1.0, 0.0, 0),
    ];

    // 256x32 texture with a deterministic pattern, alpha bits clear.
    let words: Vec<u16> = (0..256u32 * 32).map(|i| (i % 0x8000) as u16).collect();
    model.texture = Some(PackedTexture { words, height: 32 });

    model
}

/// A CAR bundle built on top of the rigged quad's mesh.
pub fn car_bundle() -> Model {
    let mut model = rigged_quad();
    model.name = Some("Quadling msc: #".to_string());
    // CAR has no bone table; ownership only.
    model.bones.clear();

    model.animations = vec![
        CarAnimation {
            name: "Walk".to_string(),
            kps: 15,
            frame_count: 3,
            frames: (0..3 * 4 * 3).map(|n| (n * 7 % 256) as i16 - 128).collect(),
        },
        CarAnimation {
            name: "Die".to_string(),
            kps: 10,
            frame_count: 1,
            frames: (0..4 * 3).map(|n| n as i16 * 16).collect(),
        },
    ];

    model.sounds = vec![
        CarSound {
            name: "walk_step".to_string(),
            data: (0..64).map(|n| (n * 512) as i16).collect(),
        },
        CarSound {
            name: "death_cry".to_string(),
            data: vec![-30000, 30000, 0, 12345],
        },
    ];

    let mut table = CrossRefTable::default();
    table.slots[0] = 0;
    table.slots[1] = 1;
    model.cross_ref = Some(table);

    model
}

pub fn vertex(x: f32, y: f32, z: f32, owner: u16) -> Vertex {
    Vertex {
        coord: DfVector3::new(x, y, z),
        owner,
        hide: 0,
    }
}

pub fn face(v: [u32; 3], u_tex: [u32; 3], v_tex: [u32; 3], flags: u16) -> Face {
    Face {
        v,
        u_tex,
        v_tex,
        flags,
        ..Face::default()
    }
}

pub fn bone(name: &str, x: f32, y: f32, z: f32, parent: i16) -> Bone {
    Bone {
        name: name.to_string(),
        pos: DfVector3::new(x, y, z),
        parent,
        hidden: 0,
    }
}
