//! Fixed reference tables: faculties with their directions and the name
//! pools used for mock data.

/// Direction value meaning "type the direction by hand".
pub const OTHER_DIRECTION: &str = "Boshqa";

pub const FACULTIES: &[(&str, &[&str])] = &[
    (
        "Pedagogika",
        &["Pedagogika", "Maktabgacha ta'lim", "Boshlang'ich ta'lim"],
    ),
    (
        "Aniq va tabiiy fanlar",
        &[
            "Matematika va Informatika",
            "Fizika va astronomiya",
            "Kimyo",
            "Biologiya",
            "Geografiya va iqtisodiy bilim asoslari",
            "Texnologik ta'lim",
            "Matematika",
            "Amaliy matematika",
        ],
    ),
    (
        "Tillarni o'qitish fakulteti",
        &[
            "O'zbek tili va adabiyoti",
            "Ona tili va adabiyoti( qozoq tili)",
            "Ona tili va adabiyoti (rus tili)",
            "Xorijiy til va adabiyoti(ingiliz tili)",
        ],
    ),
    (
        "Gumanitar fanlar va jismoniy madaniyat",
        &[
            "Tasviriy san'at",
            "Musiqa ta'limi",
            "Milliy g'oya",
            "Tarix",
            "Jismoniy madaniyat",
        ],
    ),
];

pub const FIRST_NAMES: &[&str] = &[
    "Aziz", "Bekzod", "Sardor", "Malika", "Dildora", "Otabek", "Jasur", "Madina", "Shahlo",
    "Nodir", "Jamshid", "Sevara", "Guli", "Bobur", "Dilshod", "Lola", "Farhod", "Ravshan",
    "Zarina", "Umida", "Javohir", "Shohruh", "Nigora", "Barno", "Sherzod", "Davron", "Kamola",
    "Laylo", "Sanjar", "Akmal", "Alisher", "Botir", "Dilnoza", "Feruza", "Gulnoza", "Husan",
    "Hasan", "Iroda", "Jalol", "Komil",
];

pub const SURNAMES: &[&str] = &[
    "Karimov", "Rahimov", "Abdullayev", "Yusupov", "Umarov", "Aliyev", "Nazarov", "Rustamov",
    "Ismoilov", "Qodirov", "Ahmedov", "Saidov", "Sharipov", "Zakirov", "Tursunov", "Boboyev",
    "Mirzayev", "Oripov", "Sultonov", "Xoliqov", "Rasulov", "Sobirov", "Toshpo'latov",
    "Ergashev", "Yo'ldoshev", "Norboyev", "Olimov", "Pulatov", "Qosimov", "Rajabov", "Safarov",
    "Temirov", "Usmonov", "Valiyev",
];

pub fn faculties() -> impl Iterator<Item = &'static str> {
    FACULTIES.iter().map(|(name, _)| *name)
}

pub fn directions_for(faculty: &str) -> Option<&'static [&'static str]> {
    FACULTIES
        .iter()
        .find(|(name, _)| *name == faculty)
        .map(|(_, directions)| *directions)
}

pub fn is_known_faculty(faculty: &str) -> bool {
    directions_for(faculty).is_some()
}
