use serde::Serialize;

/// every venue with its two digit code, in code order
pub const STADIUMS: [(&str, &str); 24] = [
    ("01", "桐生"),
    ("02", "戸田"),
    ("03", "江戸川"),
    ("04", "平和島"),
    ("05", "多摩川"),
    ("06", "浜名湖"),
    ("07", "蒲郡"),
    ("08", "常滑"),
    ("09", "津"),
    ("10", "三国"),
    ("11", "びわこ"),
    ("12", "住之江"),
    ("13", "尼崎"),
    ("14", "鳴門"),
    ("15", "丸亀"),
    ("16", "児島"),
    ("17", "宮島"),
    ("18", "徳山"),
    ("19", "下関"),
    ("20", "若松"),
    ("21", "芦屋"),
    ("22", "福岡"),
    ("23", "唐津"),
    ("24", "大村"),
];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Stadium {
    pub code: &'static str,
    pub name: &'static str,
}

/// # get the name of a stadium
///
/// ## Arguments
/// * `code` - the zero padded stadium code, for example `"01"`
///
/// ## Returns
/// * `Option<&str>` - the display name, none when the code is not registered
pub fn stadium_name(code: &str) -> Option<&'static str> {
    STADIUMS
        .iter()
        .find(|(stadium_code, _)| *stadium_code == code)
        .map(|(_, name)| *name)
}

/// the display name of a stadium, or the raw code when it is unknown
pub fn display_name(code: &str) -> String {
    stadium_name(code)
        .map(|name| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

pub fn is_registered(code: &str) -> bool {
    stadium_name(code).is_some()
}

pub fn all_stadiums() -> Vec<Stadium> {
    STADIUMS
        .iter()
        .map(|&(code, name)| Stadium { code, name })
        .collect()
}
