use matches::assert_matches;

use crate::gap::{Characteristic as Char, Service as Svc};

use super::*;

fn h(v: u16) -> Handle {
    Handle::new(v).unwrap()
}

fn ext_props() -> Uuid {
    gap::Descriptor::CharacteristicExtendedProperties.uuid()
}

fn cccd() -> Uuid {
    gap::Descriptor::ClientCharacteristicConfiguration.uuid()
}

/// Battery service with one characteristic and an extended properties
/// descriptor.
fn battery() -> Builder {
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0003), Prop::READ)
        .unwrap();
    b.add_descriptor(h(0x0004), ext_props(), Some(0x0001))
        .unwrap();
    b
}

/// Three services modeled after [Vol 3] Part G, Appendix B.
fn appendix_b() -> Database {
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::GenericAccess.uuid(), true, h(0x0005))
        .unwrap();
    b.add_characteristic(
        h(0x0002),
        Char::DeviceName.uuid(),
        h(0x0003),
        Prop::READ | Prop::WRITE,
    )
    .unwrap();
    b.add_characteristic(h(0x0004), Char::Appearance.uuid(), h(0x0005), Prop::READ)
        .unwrap();

    b.add_service(h(0x0006), Svc::GenericAttribute.uuid(), true, h(0x000D))
        .unwrap();
    b.add_characteristic(
        h(0x0007),
        Char::ServiceChanged.uuid(),
        h(0x0008),
        Prop::INDICATE,
    )
    .unwrap();
    b.add_descriptor(h(0x0009), cccd(), None).unwrap();
    b.add_characteristic(
        h(0x000A),
        Char::ClientSupportedFeatures.uuid(),
        h(0x000B),
        Prop::READ | Prop::WRITE,
    )
    .unwrap();
    b.add_characteristic(h(0x000C), Char::DatabaseHash.uuid(), h(0x000D), Prop::READ)
        .unwrap();

    b.add_service(h(0x000E), Svc::Glucose.uuid(), true, h(0x0013))
        .unwrap();
    b.add_included_service(h(0x000F), h(0x0014), h(0x0016), Svc::Battery.uuid())
        .unwrap();
    b.add_characteristic(
        h(0x0010),
        Char::GlucoseMeasurement.uuid(),
        h(0x0011),
        Prop::READ | Prop::INDICATE | Prop::EXT_PROPS,
    )
    .unwrap();
    b.add_descriptor(h(0x0012), ext_props(), Some(0x0000))
        .unwrap();
    b.add_descriptor(h(0x0013), cccd(), Some(0)).unwrap();

    b.add_service(h(0x0014), Svc::Battery.uuid(), false, h(0x0016))
        .unwrap();
    b.add_characteristic(h(0x0015), Char::BatteryLevel.uuid(), h(0x0016), Prop::READ)
        .unwrap();
    b.finish().unwrap()
}

#[test]
fn battery_scenario() {
    let db = battery().finish().unwrap();
    assert!(!db.is_empty());
    assert_eq!(db.services().len(), 1);

    let s = &db.services()[0];
    assert_eq!(s.handle, h(0x0001));
    assert_eq!(s.end_handle, h(0x0005));
    assert!(s.is_primary);
    assert_eq!(s.uuid, Svc::Battery);
    assert_eq!(s.characteristics.len(), 1);

    let c = &s.characteristics[0];
    assert_eq!(c.declaration_handle, h(0x0002));
    assert_eq!(c.value_handle, h(0x0003));
    assert_eq!(c.properties, Prop::READ);
    assert_eq!(c.descriptors.len(), 1);

    let d = &c.descriptors[0];
    assert_eq!(d.handle, h(0x0004));
    assert!(d.is_ext_props());
    assert_eq!(d.ext_props, ExtProp::RELIABLE_WRITE);

    assert_ne!(db.hash(), DbHash::EMPTY);
}

#[test]
fn value_before_declaration() {
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    let e = b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0001), Prop::READ);
    assert_eq!(
        e,
        Err(Error::InvalidRange {
            start: h(0x0002),
            end: h(0x0001)
        })
    );
    assert_matches!(b.finish(), Err(Error::InvalidRange { .. }));

    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    assert_matches!(
        b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0002), Prop::READ),
        Err(Error::InvalidRange { .. })
    );
}

#[test]
fn empty() {
    let db = Database::build().finish().unwrap();
    assert!(db.is_empty());
    assert!(db.services().is_empty());
    assert_eq!(db.hash(), DbHash::EMPTY);
    assert_eq!(db, Database::new());
    assert_eq!(db.to_string(), "");

    let b = Builder::with_options(BuildOpt::REQUIRE_SERVICES);
    assert!(b.is_empty());
    assert_eq!(b.finish(), Err(Error::EmptyDatabaseNotAllowed));
}

#[test]
fn clear() {
    let mut db = appendix_b();
    assert!(!db.is_empty());
    db.clear();
    assert!(db.is_empty());
    assert!(db.services().is_empty());
    assert_eq!(db.hash(), DbHash::EMPTY);
    assert_eq!(db, Database::default());
}

#[test]
fn out_of_order() {
    let mut b = battery();
    assert_eq!(b.last_handle(), Some(h(0x0004)));
    assert_eq!(
        b.add_descriptor(h(0x0004), cccd(), None),
        Err(Error::OutOfOrderHandle {
            hdl: h(0x0004),
            last: h(0x0004)
        })
    );
    // The first error is sticky
    assert_matches!(
        b.add_service(h(0x0010), Svc::Battery.uuid(), true, h(0x0010)),
        Err(Error::OutOfOrderHandle { .. })
    );
    assert_matches!(b.finish(), Err(Error::OutOfOrderHandle { .. }));

    // Descriptor may not reuse the value handle
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0004), Prop::READ)
        .unwrap();
    assert_matches!(
        b.add_descriptor(h(0x0003), cccd(), None),
        Err(Error::OutOfOrderHandle { .. })
    );
}

#[test]
fn service_ranges() {
    let mut b = Database::build();
    assert_eq!(
        b.add_service(h(0x0005), Svc::Battery.uuid(), true, h(0x0004)),
        Err(Error::InvalidRange {
            start: h(0x0005),
            end: h(0x0004)
        })
    );

    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    assert_eq!(
        b.add_service(h(0x0005), Svc::HeartRate.uuid(), true, h(0x0008)),
        Err(Error::OverlappingService {
            hdl: h(0x0005),
            prev_end: h(0x0005)
        })
    );

    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0002))
        .unwrap();
    assert_eq!(
        b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0003), Prop::READ),
        Err(Error::OutsideService {
            hdl: h(0x0003),
            end: h(0x0002)
        })
    );

    // Single-handle service followed by another one
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0001))
        .unwrap();
    b.add_service(h(0x0002), Svc::HeartRate.uuid(), true, Handle::MAX)
        .unwrap();
    let db = b.finish().unwrap();
    assert_eq!(db.services().len(), 2);
    assert!(db.services()[0].characteristics.is_empty());
}

#[test]
fn nesting() {
    let mut b = Database::build();
    assert_eq!(
        b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0003), Prop::READ),
        Err(Error::NoOpenService(h(0x0002)))
    );

    let mut b = Database::build();
    assert_eq!(
        b.add_included_service(h(0x0002), h(0x0010), h(0x0012), Svc::Battery.uuid()),
        Err(Error::NoOpenService(h(0x0002)))
    );

    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    assert_eq!(
        b.add_descriptor(h(0x0002), cccd(), None),
        Err(Error::NoOpenCharacteristic(h(0x0002)))
    );

    let mut b = battery();
    assert_eq!(
        b.add_included_service(h(0x0005), h(0x0010), h(0x0012), Svc::Glucose.uuid()),
        Err(Error::IncludeAfterCharacteristic(h(0x0005)))
    );

    let mut b = battery();
    assert_eq!(
        b.add_descriptor(h(0x0005), crate::gap::Declaration::Include.uuid(), None),
        Err(Error::ReservedDescriptorType {
            hdl: h(0x0005),
            uuid: crate::gap::Declaration::Include.uuid()
        })
    );
}

#[test]
fn descriptor_payload() {
    let mut b = battery();
    b.add_descriptor(h(0x0005), cccd(), Some(0)).unwrap();

    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0003), Prop::READ)
        .unwrap();
    assert_eq!(
        b.add_descriptor(h(0x0004), ext_props(), None),
        Err(Error::InconsistentDescriptorPayload(h(0x0004)))
    );

    let mut b = battery();
    assert_eq!(
        b.add_descriptor(h(0x0005), cccd(), Some(1)),
        Err(Error::InconsistentDescriptorPayload(h(0x0005)))
    );
}

#[test]
fn adjacent_value() {
    let mut b = Builder::with_options(BuildOpt::ADJACENT_VALUE);
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    assert_eq!(
        b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0004), Prop::READ),
        Err(Error::NonAdjacentValue {
            decl: h(0x0002),
            value: h(0x0004)
        })
    );

    // Gaps between the declaration and value are tolerated by default
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0005))
        .unwrap();
    b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0004), Prop::READ)
        .unwrap();
    b.add_descriptor(h(0x0005), cccd(), None).unwrap();
    let db = b.finish().unwrap();
    assert_eq!(Database::deserialize(&db.serialize()), Ok(db));
}

#[test]
fn includes() {
    // Forward reference to a service that is discovered later
    let db = appendix_b();
    let s = db.find_service(h(0x000F)).unwrap();
    let inc = &s.included_services[0];
    let target = db.included_target(inc).unwrap();
    assert_eq!(target.handle, h(0x0014));
    assert!(!target.is_primary);

    // Reference to a service that is not part of this database
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Glucose.uuid(), true, h(0x0003))
        .unwrap();
    b.add_included_service(h(0x0002), h(0x0100), h(0x0110), Svc::Battery.uuid())
        .unwrap();
    let db = b.finish().unwrap();
    let inc = &db.services()[0].included_services[0];
    assert!(db.included_target(inc).is_none());

    // Inverted range supplied by the caller
    let db = appendix_b();
    let inc = IncludedService {
        handle: h(0x000F),
        uuid: Svc::Battery.uuid(),
        start_handle: h(0x0014),
        end_handle: h(0x0010),
    };
    assert!(inc.target_range().is_none());
    assert!(db.included_target(&inc).is_none());

    // Backward reference with the wrong range
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0003))
        .unwrap();
    b.add_service(h(0x0004), Svc::Glucose.uuid(), true, h(0x0006))
        .unwrap();
    assert_eq!(
        b.add_included_service(h(0x0005), h(0x0001), h(0x0002), Svc::Battery.uuid()),
        Err(Error::IncludeMismatch {
            hdl: h(0x0005),
            start: h(0x0001),
            end: h(0x0002)
        })
    );

    // Forward reference contradicted by the service discovered later
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Glucose.uuid(), true, h(0x0003))
        .unwrap();
    b.add_included_service(h(0x0002), h(0x0004), h(0x0008), Svc::Battery.uuid())
        .unwrap();
    assert_eq!(
        b.add_service(h(0x0004), Svc::Battery.uuid(), false, h(0x0006)),
        Err(Error::IncludeMismatch {
            hdl: h(0x0002),
            start: h(0x0004),
            end: h(0x0008)
        })
    );

    // Inverted target range
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Glucose.uuid(), true, h(0x0003))
        .unwrap();
    assert_matches!(
        b.add_included_service(h(0x0002), h(0x0009), h(0x0008), Svc::Battery.uuid()),
        Err(Error::InvalidRange { .. })
    );
}

#[test]
fn find_service_containment() {
    let mut b = Database::build();
    b.add_service(h(0x0010), Svc::Battery.uuid(), true, h(0x0020))
        .unwrap();
    let db = b.finish().unwrap();
    assert_eq!(db.find_service(h(0x0015)).map(|s| s.handle), Some(h(0x0010)));
    assert_eq!(db.find_service(h(0x0010)).map(|s| s.handle), Some(h(0x0010)));
    assert_eq!(db.find_service(h(0x0020)).map(|s| s.handle), Some(h(0x0010)));
    assert!(db.find_service(h(0x0021)).is_none());
    assert!(db.find_service(h(0x000F)).is_none());
    assert!(find_service(&[], h(0x0015)).is_none());
}

#[test]
fn find_attributes() {
    let db = appendix_b();
    assert_eq!(
        find_service(db.services(), h(0x0009)).map(|s| s.uuid),
        Some(Svc::GenericAttribute.uuid())
    );
    let c = db.find_characteristic(h(0x0009)).unwrap();
    assert_eq!(c.uuid, Char::ServiceChanged);
    let c = db.find_characteristic(h(0x0011)).unwrap();
    assert_eq!(c.declaration_handle, h(0x0010));
    assert!(db.find_characteristic(h(0x000E)).is_none());
    assert!(db.find_characteristic(h(0x000F)).is_none());

    let d = db.find_descriptor(h(0x0013)).unwrap();
    assert_eq!(d.uuid, cccd());
    assert!(db.find_descriptor(h(0x0011)).is_none());
    assert!(db.find_descriptor(h(0xFFFF)).is_none());
}

#[test]
fn round_trip() {
    for db in [appendix_b(), battery().finish().unwrap(), Database::new()] {
        let v = db.serialize();
        assert!(v.windows(2).all(|w| w[0].hdl < w[1].hdl));
        let restored = Database::deserialize(&v).unwrap();
        assert_eq!(restored, db);
        assert_eq!(restored.hash(), db.hash());
        assert_eq!(restored.serialize(), v);
    }
}

#[test]
fn non_overlapping() {
    let db = appendix_b();
    let s = db.services();
    assert_eq!(s.len(), 4);
    assert!(s.windows(2).all(|w| w[0].end_handle < w[1].handle));
    assert!(s.iter().all(|s| s.handle <= s.end_handle));
}

#[test]
fn hash_determinism() {
    let db = appendix_b();
    assert_eq!(db.hash(), appendix_b().hash());
    assert_eq!(db.hash(), db.clone().hash());

    // Same table restored through the cache encoding
    let (restored, ok) = Database::load(&db.serialize());
    assert!(ok);
    assert_eq!(restored.hash(), db.hash());

    // Any single field change alters the hash
    let mut v = db.serialize();
    if let AttrValue::Characteristic { ref mut props, .. } = v[1].val {
        *props ^= Prop::NOTIFY.bits();
    }
    assert_ne!(Database::deserialize(&v).unwrap().hash(), db.hash());

    let mut v = db.serialize();
    for at in &mut v {
        if let AttrValue::ExtProps(ref mut p) = at.val {
            *p = 1;
        }
    }
    assert_ne!(Database::deserialize(&v).unwrap().hash(), db.hash());

    let mut v = db.serialize();
    let last = v.len() - 1;
    if let AttrValue::Characteristic { ref mut uuid, .. } = v[last].val {
        *uuid = Char::DeviceName.uuid();
    }
    assert_ne!(Database::deserialize(&v).unwrap().hash(), db.hash());

    assert_ne!(battery().finish().unwrap().hash(), db.hash());

    // Service end handle alone
    let mut b = Database::build();
    b.add_service(h(0x0001), Svc::Battery.uuid(), true, h(0x0009))
        .unwrap();
    b.add_characteristic(h(0x0002), Char::BatteryLevel.uuid(), h(0x0003), Prop::READ)
        .unwrap();
    b.add_descriptor(h(0x0004), ext_props(), Some(0x0001))
        .unwrap();
    let wide = b.finish().unwrap();
    let narrow = battery().finish().unwrap();
    assert_ne!(wide, narrow);
    assert_ne!(wide.hash(), narrow.hash());
}

#[test]
fn display() {
    let s = battery().finish().unwrap().to_string();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(
        lines,
        [
            "[0x0001] Battery <0x180F> end=0x0005",
            "[0x0002] |__ BatteryLevel <0x2A19> value=0x0003 props=0x02",
            "[0x0004]     |__ CharacteristicExtendedProperties <0x2900> ext_props=0x0001",
        ]
    );
    assert!(appendix_b().to_string().contains("[Include <0x180F> 0x0014..=0x0016]"));
    appendix_b().dump();
}
