//! Prop catalog: the static definitions for every instrument in the showcase
//! room and the examination room. Pure data; the scene builders instantiate
//! these through the physics-wrapper factory in `props`.

use engine_core::Vec3;
use glam::{EulerRot, Quat};

/// Size class of a prop. Selects the grab capture radius; fixtures are static
/// and never grabbable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropClass {
    Instrument,
    Device,
    Fixture,
}

/// One question/answer pair shown by the info panel.
#[derive(Debug, Clone, Copy)]
pub struct QaPair {
    pub question: &'static str,
    pub answer: &'static str,
}

/// Physics parameters of a prop's wrapper body.
#[derive(Debug, Clone, Copy)]
pub struct PropPhysicsDef {
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
}

/// Immutable catalog entry for one prop.
#[derive(Debug, Clone, Copy)]
pub struct PropDefinition {
    pub id: &'static str,
    pub asset: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub class: PropClass,
    /// World position of the wrapper at spawn.
    pub position: Vec3,
    /// Authored wrapper rotation, degrees (XYZ order, as in the art tables).
    pub rotation_deg: Vec3,
    /// Visual-only scale of the imported model.
    pub scale: Vec3,
    /// Local offset of the visual under the wrapper, compensating for the
    /// imported asset's pivot.
    pub visual_offset: Vec3,
    /// Wrapper collider half extents.
    pub half_extents: Vec3,
    /// Physics parameters; `None` marks a static fixture.
    pub physics: Option<PropPhysicsDef>,
    /// Alternate visual attached to the hand while held (stethoscope
    /// chestpiece swap). The full model is hidden for the duration.
    pub held_swap_asset: Option<&'static str>,
    pub qa: &'static [QaPair],
}

impl PropDefinition {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation_deg.x.to_radians(),
            self.rotation_deg.y.to_radians(),
            self.rotation_deg.z.to_radians(),
        )
    }

    pub fn is_grabbable(&self) -> bool {
        self.physics.is_some() && self.class != PropClass::Fixture
    }
}

/// Look up a definition by id within a catalog slice.
pub fn find(catalog: &'static [PropDefinition], id: &str) -> Option<&'static PropDefinition> {
    catalog.iter().find(|def| def.id == id)
}

const STANDARD_PHYSICS: PropPhysicsDef = PropPhysicsDef {
    mass: 1.0,
    restitution: 0.4,
    friction: 0.6,
};

// ── Showcase room ───────────────────────────────────────────────────────
//
// Two rows of display tables; every item carries an info button and a Q&A set.

pub const SHOWCASE_PROPS: &[PropDefinition] = &[
    PropDefinition {
        id: "bandage",
        asset: "bandage.glb",
        title: "Bandage",
        description: "An elastic wrap used to hold dressings in place, support an injured area, or apply gentle pressure. It is wound neatly around the cleaned and covered wound, protecting it from contamination while it heals.",
        class: PropClass::Instrument,
        position: Vec3::new(-1.5, 2.0, 7.8),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(0.03, 0.03, 0.03),
        visual_offset: Vec3::new(0.0, -0.2, 0.0),
        half_extents: Vec3::new(0.2, 0.2, 0.2),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why must a bandage be wound with just the right tension?",
                answer: "Firm enough to keep the wound closed and stable, loose enough not to restrict blood flow. Too tight starves the tissue; too loose gives no protection.",
            },
            QaPair {
                question: "How does a bandage help reduce swelling?",
                answer: "Light, even pressure controls the flow of blood and fluid into the injured area, which limits swelling and eases pain as the injury settles.",
            },
            QaPair {
                question: "Why does the wrapping direction matter?",
                answer: "The direction sets how pressure and support are distributed. Wrapped correctly, the bandage stays put without pinching sensitive areas or limiting movement.",
            },
        ],
    },
    PropDefinition {
        id: "oximeter",
        asset: "oximeter.glb",
        title: "Pulse Oximeter",
        description: "Clips onto a fingertip and shines light through the skin to measure blood oxygen saturation (SpO2) and pulse rate. A quick, painless window into a patient's breathing and circulation.",
        class: PropClass::Instrument,
        position: Vec3::new(-1.5, 2.0, 9.7),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(0.13, 0.13, 0.13),
        visual_offset: Vec3::new(0.0, -0.15, 0.0),
        half_extents: Vec3::new(0.14, 0.18, 0.25),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why is the oximeter used to check whether the body is getting enough oxygen?",
                answer: "The saturation number shows how much of the inhaled oxygen actually reaches the blood, a fast way to see whether the patient needs closer attention.",
            },
            QaPair {
                question: "Why do readings change when the patient moves?",
                answer: "Motion makes it hard for the light sensor to read blood flow steadily, so patients are asked to hold still for an accurate number.",
            },
            QaPair {
                question: "Why check saturation regularly on a sick patient?",
                answer: "Oxygen levels can fall before any symptom shows. Regular checks catch the drop early.",
            },
        ],
    },
    PropDefinition {
        id: "medical_scissors",
        asset: "medical_scissors.glb",
        title: "Medical Scissors",
        description: "Cut bandages, gauze, and clothing safely close to the skin. One blade ends in a blunt tip so the scissors can slide under a dressing without injuring the patient.",
        class: PropClass::Instrument,
        position: Vec3::new(-1.5, 2.0, 11.7),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(0.015, 0.015, 0.015),
        visual_offset: Vec3::new(0.0, -0.05, 0.0),
        half_extents: Vec3::new(0.1, 0.05, 0.25),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why is one tip blunt instead of sharp?",
                answer: "The blunt tip slips between skin and dressing without cutting the patient, extra protection where the wound is sensitive or hard to see.",
            },
            QaPair {
                question: "Why the special materials?",
                answer: "Rust-free, sterilizable steel keeps the tool clean and strong so it cannot carry germs into a wound.",
            },
            QaPair {
                question: "How do they speed up emergency care?",
                answer: "Clothing and dressings can be cut away quickly without risking the skin underneath, so treatment starts sooner.",
            },
        ],
    },
    PropDefinition {
        id: "reflex_hammer",
        asset: "reflex_hammer.glb",
        title: "Reflex Hammer",
        description: "Used to tap tendon points such as the knee to test nerve reflexes. The response (strong, weak, or absent) tells the examiner how well the nervous system's pathways are working.",
        class: PropClass::Instrument,
        position: Vec3::new(-1.5, 2.0, 13.8),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(3.0, 3.0, 3.0),
        visual_offset: Vec3::new(0.0, -0.05, 0.0),
        half_extents: Vec3::new(0.1, 0.05, 0.3),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why are reflex checks important for the nervous system?",
                answer: "A tap should trigger an automatic response. A response that is slow, exaggerated, or missing points at a problem somewhere along the nerve pathway.",
            },
            QaPair {
                question: "What do overly strong or weak reflexes suggest?",
                answer: "Exaggerated reflexes hint at a central problem in the brain or spinal cord; weak or absent ones point toward the peripheral nerves or the muscle itself.",
            },
            QaPair {
                question: "Why do reflex hammers come in different shapes?",
                answer: "Different heads suit different spots, lighter ones for small areas and heavier ones for deep reflexes, so the examiner can pick the right tool for the test.",
            },
        ],
    },
    PropDefinition {
        id: "stethoscope",
        asset: "stethoscope.glb",
        title: "Stethoscope",
        description: "Listens to sounds inside the body: heartbeat, breathing, bowel sounds. The chestpiece rests on the patient's skin while the examiner listens through the earpieces; the classic first instrument of any physical exam.",
        class: PropClass::Device,
        position: Vec3::new(-1.5, 2.0, 15.6),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(0.0015, 0.0015, 0.0015),
        visual_offset: Vec3::new(0.0, -0.15, 0.0),
        half_extents: Vec3::new(0.2, 0.175, 0.2),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "What can the sound of a heartbeat reveal?",
                answer: "Strength, rhythm, and regularity. A strong, even beat suggests good circulation; a weak or irregular one can mean fatigue, dehydration, or low blood pressure.",
            },
            QaPair {
                question: "Why does chestpiece placement matter so much?",
                answer: "Each spot on the chest listens to a different part of the heart and lungs. The right position gives a clearer, more specific sound.",
            },
            QaPair {
                question: "Why does the heart sound faster or slower during an exam?",
                answer: "The heart follows the body's state: anxiety, standing up, or exhaustion speed it up, while weakness or fluid loss can slow it down.",
            },
        ],
    },
    PropDefinition {
        id: "gauze",
        asset: "gauze.glb",
        title: "Gauze",
        description: "Thin sterile fabric for cleaning wounds, absorbing fluid, or lying directly on a wound under a bandage. Its open weave absorbs well while staying gentle on healing tissue.",
        class: PropClass::Instrument,
        position: Vec3::new(2.5, 2.0, 7.8),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(5.0, 5.0, 5.0),
        visual_offset: Vec3::new(0.0, -0.2, 0.0),
        half_extents: Vec3::new(0.2, 0.3, 0.1),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why is gauze so good at covering wounds?",
                answer: "Its porous structure absorbs blood and fluid effectively while staying soft, so dressing changes stay comfortable and safe.",
            },
            QaPair {
                question: "Why do some wounds need to stay dry and others moist?",
                answer: "Wounds heal differently: some close faster kept dry to suppress bacteria, others need a little moisture for new skin to grow. Care is matched to the wound.",
            },
            QaPair {
                question: "How does gauze keep dirt and bacteria out?",
                answer: "The weave is tight enough to hold back dust and germs from outside, keeping the area clean while it heals.",
            },
        ],
    },
    PropDefinition {
        id: "syringe",
        asset: "syringe.glb",
        title: "Syringe",
        description: "A barrel and plunger for injecting medication or drawing fluid samples, with a sterile needle on the tip. Essential for giving drugs effectively and for minimally invasive diagnostics.",
        class: PropClass::Instrument,
        position: Vec3::new(2.5, 2.0, 9.9),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(0.001, 0.001, 0.001),
        visual_offset: Vec3::new(0.0, -0.2, 0.0),
        half_extents: Vec3::new(0.1, 0.14, 0.35),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why must injections go into specific sites?",
                answer: "Muscle, vessels, and nerves differ by location. The right site lets the drug work properly without causing injury or needless pain.",
            },
            QaPair {
                question: "How does needle size affect the sting?",
                answer: "Smaller needles sting less, but the size is chosen for the fluid and the tissue depth so the dose is absorbed correctly.",
            },
            QaPair {
                question: "Why push the air out before injecting?",
                answer: "An air bubble entering the bloodstream can disturb circulation. Expelling it first keeps the injection safe and consistent.",
            },
        ],
    },
    PropDefinition {
        id: "thermometer",
        asset: "thermometer.glb",
        title: "Digital Thermometer",
        description: "Measures body temperature to detect fever or hypothermia. Point the sensor at the patient's forehead and the reading appears within seconds, fast and hygienic.",
        class: PropClass::Instrument,
        position: Vec3::new(2.5, 2.0, 11.7),
        rotation_deg: Vec3::new(80.0, 160.0, 0.0),
        scale: Vec3::new(0.25, 0.25, 0.25),
        visual_offset: Vec3::new(0.0, -0.05, 0.0),
        half_extents: Vec3::new(0.1, 0.075, 0.25),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why measure temperature when someone feels unwell?",
                answer: "Temperature is a first clue: it rises when the body fights infection or inflammation, so it separates fever from other causes of feeling ill.",
            },
            QaPair {
                question: "Why do readings vary through the day?",
                answer: "Temperature shifts naturally with activity, food, emotion, and surroundings, which is why it is taken at rest, under consistent conditions.",
            },
            QaPair {
                question: "Does a normal temperature mean the patient is healthy?",
                answer: "No. Exhaustion, stress, mild dehydration, or low blood pressure often leave temperature untouched. Other signs still need checking.",
            },
        ],
    },
    PropDefinition {
        id: "tensimeter",
        asset: "tensimeter.glb",
        title: "Digital Blood Pressure Monitor",
        description: "Measures blood pressure, a vital sign of cardiovascular health. The cuff wraps around the upper arm, inflates, and the systolic and diastolic values appear automatically on the display.",
        class: PropClass::Device,
        position: Vec3::new(2.5, 2.0, 13.8),
        rotation_deg: Vec3::new(-75.0, -35.0, -80.0),
        scale: Vec3::new(0.3, 0.3, 0.3),
        visual_offset: Vec3::new(0.0, -0.15, 0.0),
        half_extents: Vec3::new(0.2, 0.15, 0.2),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "Why does blood pressure change between sitting and standing?",
                answer: "Posture changes how blood flows. Standing pulls blood downward and the heart must adjust; sitting or lying keeps the flow steadier.",
            },
            QaPair {
                question: "Why check blood pressure even when feeling fine?",
                answer: "High or low pressure often has no symptoms at all. Regular checks catch it before serious complaints appear.",
            },
            QaPair {
                question: "Why is the measurement often taken twice?",
                answer: "A single reading can be thrown off by tension, movement, or arm position. A second confirms the result is stable and representative.",
            },
        ],
    },
    PropDefinition {
        id: "iv_stand",
        asset: "iv_stand.glb",
        title: "IV Stand",
        description: "A wheeled pole that holds infusion bags above the patient so gravity can feed the line.",
        class: PropClass::Fixture,
        position: Vec3::new(2.5, 0.1, 5.4),
        rotation_deg: Vec3::ZERO,
        scale: Vec3::new(0.04, 0.04, 0.04),
        visual_offset: Vec3::ZERO,
        half_extents: Vec3::new(0.3, 1.0, 0.3),
        physics: None,
        held_swap_asset: None,
        qa: &[],
    },
    PropDefinition {
        id: "iv_bag",
        asset: "iv_bag.glb",
        title: "IV Bag",
        description: "Delivers fluid, medication, or nutrients directly into a vein, drop by drop. Key for rehydration, electrolyte correction, and long-running medication.",
        class: PropClass::Device,
        position: Vec3::new(2.5, 2.0, 15.6),
        rotation_deg: Vec3::new(90.0, 0.0, -10.0),
        scale: Vec3::new(0.05, 0.05, 0.05),
        visual_offset: Vec3::new(0.0, -0.15, 0.0),
        half_extents: Vec3::new(0.2, 0.15, 0.2),
        physics: Some(STANDARD_PHYSICS),
        held_swap_asset: None,
        qa: &[
            QaPair {
                question: "How does IV fluid help a weak or dehydrated patient?",
                answer: "It replaces lost water and electrolytes directly, restoring blood volume so energy, alertness, and blood pressure recover.",
            },
            QaPair {
                question: "Why can't some fluids be given quickly?",
                answer: "Running fluid in too fast overworks the heart and kidneys and can upset the salt balance that nerves and muscles depend on.",
            },
            QaPair {
                question: "Why is the drip rate regulated?",
                answer: "Each patient needs a different volume. Controlling the rate delivers fluid at the rhythm the patient's condition calls for.",
            },
        ],
    },
];

// ── Examination room ────────────────────────────────────────────────────
//
// Three instruments on the side table next to the patient bed. Start poses are
// the scripted landing poses the reset action returns items to.

const EXAM_TABLE_Y: f32 = 1.65;

pub const EXAM_PROPS: &[PropDefinition] = &[
    PropDefinition {
        id: "stethoscope",
        asset: "stethoscope.glb",
        title: "Stethoscope",
        description: "Listen to the patient's heart and lungs by resting the chestpiece on the chest.",
        class: PropClass::Device,
        position: Vec3::new(-17.0, EXAM_TABLE_Y, 27.5),
        rotation_deg: Vec3::new(0.0, 180.0, 0.0),
        scale: Vec3::new(0.0009, 0.0009, 0.0009),
        visual_offset: Vec3::ZERO,
        half_extents: Vec3::new(0.2, 0.1, 0.15),
        physics: Some(PropPhysicsDef {
            mass: 0.5,
            restitution: 0.0,
            friction: 1.0,
        }),
        held_swap_asset: Some("chestpiece.glb"),
        qa: &[],
    },
    PropDefinition {
        id: "thermometer",
        asset: "thermometer.glb",
        title: "Digital Thermometer",
        description: "Point at the patient's forehead to read body temperature.",
        class: PropClass::Instrument,
        position: Vec3::new(-16.3, EXAM_TABLE_Y, 27.5),
        rotation_deg: Vec3::new(90.0, 180.0, 0.0),
        scale: Vec3::new(0.25, 0.25, 0.25),
        visual_offset: Vec3::ZERO,
        half_extents: Vec3::new(0.1, 0.075, 0.25),
        physics: Some(PropPhysicsDef {
            mass: 1.0,
            restitution: 0.2,
            friction: 0.6,
        }),
        held_swap_asset: None,
        qa: &[],
    },
    PropDefinition {
        id: "tensimeter",
        asset: "tensimeter.glb",
        title: "Digital Blood Pressure Monitor",
        description: "Wrap the cuff around the patient's upper arm to measure blood pressure.",
        class: PropClass::Device,
        position: Vec3::new(-17.5, EXAM_TABLE_Y, 27.5),
        rotation_deg: Vec3::new(0.0, 180.0, 115.0),
        scale: Vec3::new(0.3, 0.3, 0.3),
        visual_offset: Vec3::ZERO,
        half_extents: Vec3::new(0.2, 0.15, 0.2),
        physics: Some(PropPhysicsDef {
            mass: 2.0,
            restitution: 0.1,
            friction: 0.6,
        }),
        held_swap_asset: None,
        qa: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn showcase_ids_are_unique() {
        for (i, a) in SHOWCASE_PROPS.iter().enumerate() {
            for b in &SHOWCASE_PROPS[i + 1..] {
                assert_ne!(a.id, b.id, "duplicate catalog id {}", a.id);
            }
        }
    }

    #[test]
    fn fixtures_are_not_grabbable() {
        let stand = find(SHOWCASE_PROPS, "iv_stand").unwrap();
        assert!(!stand.is_grabbable());
        let thermo = find(EXAM_PROPS, "thermometer").unwrap();
        assert!(thermo.is_grabbable());
    }

    #[test]
    fn grabbable_props_have_questions_in_showcase() {
        for def in SHOWCASE_PROPS {
            if def.class != PropClass::Fixture {
                assert!(!def.qa.is_empty(), "{} has no Q&A", def.id);
            }
        }
    }
}
