//! Types from the upstream `common` package.

proto_enum! {
    /// LoRaWAN region.
    pub enum Region {
        Eu868 = 0 => "EU868",
        Us915 = 2 => "US915",
        Cn779 = 3 => "CN779",
        Eu433 = 4 => "EU433",
        Au915 = 5 => "AU915",
        Cn470 = 6 => "CN470",
        As923 = 7 => "AS923",
        Kr920 = 8 => "KR920",
        In865 = 9 => "IN865",
        Ru864 = 10 => "RU864",
        Ism2400 = 11 => "ISM2400",
        As9232 = 12 => "AS923_2",
        As9233 = 13 => "AS923_3",
        As9234 = 14 => "AS923_4",
    }
}

proto_enum! {
    /// LoRaWAN MAC layer version.
    pub enum MacVersion {
        Lorawan100 = 0 => "LORAWAN_1_0_0",
        Lorawan101 = 1 => "LORAWAN_1_0_1",
        Lorawan102 = 2 => "LORAWAN_1_0_2",
        Lorawan103 = 3 => "LORAWAN_1_0_3",
        Lorawan104 = 4 => "LORAWAN_1_0_4",
        Lorawan110 = 5 => "LORAWAN_1_1_0",
    }
}

proto_enum! {
    /// Regional Parameters revision.
    pub enum RegParamsRevision {
        A = 0 => "A",
        B = 1 => "B",
        Rp002100 = 2 => "RP002_1_0_0",
        Rp002101 = 3 => "RP002_1_0_1",
        Rp002102 = 4 => "RP002_1_0_2",
        Rp002103 = 5 => "RP002_1_0_3",
        Rp002104 = 6 => "RP002_1_0_4",
    }
}

proto_enum! {
    /// Device class currently enabled.
    pub enum DeviceClass {
        ClassA = 0 => "CLASS_A",
        ClassB = 1 => "CLASS_B",
        ClassC = 2 => "CLASS_C",
    }
}

/// Geographic location of a gateway.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Location {
    #[prost(double, tag = "1")]
    pub latitude: f64,
    #[prost(double, tag = "2")]
    pub longitude: f64,
    #[prost(double, tag = "3")]
    pub altitude: f64,
    #[prost(float, tag = "5")]
    pub accuracy: f32,
}
