// Subset of the Bluetooth SIG assigned numbers ([Assigned Numbers] Section
// 3.4, 3.7, 3.8) referenced by GATT discovery and the database hash.

uuid16_enum! {
    /// GATT services ([Assigned Numbers] Section 3.4).
    pub enum Service {
        GenericAccess = 0x1800,
        GenericAttribute = 0x1801,
        ImmediateAlert = 0x1802,
        LinkLoss = 0x1803,
        TxPower = 0x1804,
        CurrentTime = 0x1805,
        Glucose = 0x1808,
        HealthThermometer = 0x1809,
        DeviceInformation = 0x180A,
        HeartRate = 0x180D,
        Battery = 0x180F,
        HumanInterfaceDevice = 0x1812,
    }
}

uuid16_enum! {
    /// GATT attribute types ([Assigned Numbers] Section 3.5).
    pub enum Declaration {
        PrimaryService = 0x2800,
        SecondaryService = 0x2801,
        Include = 0x2802,
        Characteristic = 0x2803,
    }
}

uuid16_enum! {
    /// GATT characteristic descriptors ([Assigned Numbers] Section 3.7).
    pub enum Descriptor {
        CharacteristicExtendedProperties = 0x2900,
        CharacteristicUserDescription = 0x2901,
        ClientCharacteristicConfiguration = 0x2902,
        ServerCharacteristicConfiguration = 0x2903,
        CharacteristicPresentationFormat = 0x2904,
        CharacteristicAggregateFormat = 0x2905,
    }
}

uuid16_enum! {
    /// GATT characteristic and object types ([Assigned Numbers] Section 3.8).
    pub enum Characteristic {
        DeviceName = 0x2A00,
        Appearance = 0x2A01,
        ServiceChanged = 0x2A05,
        GlucoseMeasurement = 0x2A18,
        BatteryLevel = 0x2A19,
        ModelNumberString = 0x2A24,
        ManufacturerNameString = 0x2A29,
        HeartRateMeasurement = 0x2A37,
        ClientSupportedFeatures = 0x2B29,
        DatabaseHash = 0x2B2A,
    }
}
