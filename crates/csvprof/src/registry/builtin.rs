//! Built-in named tests.
//!
//! Patterns use ASCII classes (`[0-9]` rather than `\d`) so digits outside
//! ASCII never pass a numeric pattern.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::predicate::{Predicate, Primitive, RegexTest};

const LAT: &str = r#"(?x)
(?:
(   # sign first, optional decimal seconds
    ([+\-\x{2212}]|(N|S)\s)
    (
        (90\x{B0}\s?00['\x{2032}](\s?00["\x{2033}])?)
    |
        (([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
|   # sign last, optional decimal seconds
    (
        (90\x{B0}\s?00['\x{2032}](\s?00["\x{2033}])?)
    |
        (([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
    \s?(N|S)
|   # sign first, optional decimal minutes
    ([+\-\x{2212}]|(N|S)\s)
    ([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
|   # sign last, optional decimal minutes
    ([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
    \s?(N|S)
)
)"#;

const LON: &str = r#"(?x)
(?:
(   # sign first, optional decimal seconds
    ([+\-\x{2212}]|(E|W)\s)
    (
        (180\x{B0}\s?00['\x{2032}](\s?00["\x{2033}])?)
    |
        ((1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
|   # sign last, optional decimal seconds
    (
        (180\x{B0}\s?00['\x{2032}](\s?00["\x{2033}])?)
    |
        ((1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
    \s?(E|W)
|   # sign first, optional decimal minutes
    ([+\-\x{2212}]|(E|W)\s)
    (1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
|   # sign last, optional decimal minutes
    (1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
    \s?(E|W)
)
)"#;

const LATLON: &str = r#"(?x)
(?:
(   # sign first, optional decimal seconds
    ([+\-\x{2212}]|(N|S)\s)
    (
        (90\x{B0}\s?00['\x{2032}]\s?00["\x{2033}])
    |
        (([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
    (\s|(,|;)\s?)
    ([+\-\x{2212}]|(E|W)\s)
    (
        (180\x{B0}\s?00['\x{2032}](\s?00["\x{2033}])?)
    |
        ((1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
|   # sign last, optional decimal seconds
    (
        (90\x{B0}\s?00['\x{2032}]\s?00["\x{2033}])
    |
        (([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
    \s?(N|S)
    (\s|(,|;)\s?)
    (
        (180\x{B0}\s?00['\x{2032}](\s?00["\x{2033}])?)
    |
        ((1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9]['\x{2032}]\s?[0-5][0-9](\.[0-9]{1,4})?["\x{2033}])
    )
    \s?(E|W)
|   # sign first, optional decimal minutes
    ([+\-\x{2212}]|(N|S)\s)
    (
        (90\x{B0}\s?00['\x{2032}])
    |
        ([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
    )
    (\s|(,|;)\s?)
    ([+\-\x{2212}]|(E|W)\s)
    (
        (180\x{B0}\s?00['\x{2032}])
    |
        (1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
    )
|   # sign last, optional decimal minutes
    (
        (90\x{B0}\s?00['\x{2032}])
    |
        ([1-8][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
    )
    \s?(N|S)
    (\s|(,|;)\s?)
    (
        (180\x{B0}\s?00['\x{2032}])
    |
        (1[0-7][0-9]|[1-9][0-9]|[0-9])\x{B0}\s?[0-5][0-9](\.[0-9]{1,6})?['\x{2032}]
    )
    \s?(E|W)
)
)"#;

const LATDEC: &str = r"(?x)
(?:
(
    ([+\-\x{2212}]|(N|S)\s)?                        # sign first
    (90(\.0{1,8})?|[0-8]?[0-9](\.[0-9]{1,8})?)
    \x{B0}?
|
    (90(\.0{1,8})?|[0-8]?[0-9](\.[0-9]{1,8})?)
    \x{B0}?\s?(N|S)                                 # sign last
)
)";

const LONDEC: &str = r"(?x)
(?:
(
    ([+\-\x{2212}]|(E|W)\s)?                        # sign first
    (180(\.0{1,8})?|(1[0-7][0-9]|[1-9][0-9]|[0-9])(\.[0-9]{1,8})?)
    \x{B0}?
|
    (180(\.0{1,8})?|(1[0-7][0-9]|[1-9][0-9]|[0-9])(\.[0-9]{1,8})?)
    \x{B0}?\s?(E|W)                                 # sign last
)
)";

const LATLONDEC: &str = r"(?x)
(?:
(
    ([+\-\x{2212}]|(N|S)\s)?                        # sign first
    (90(\.0{1,8})?|[0-8]?[0-9](\.[0-9]{1,8})?)
    \x{B0}?
    [,;]?\s
    ([+\-\x{2212}]|(E|W)\s)?
    (180(\.0{1,8})?|(1[0-7][0-9]|[1-9][0-9]|[0-9])(\.[0-9]{1,8})?)
    \x{B0}?
)
|
(
    (90(\.0{1,8})?|[0-8]?[0-9](\.[0-9]{1,8})?)
    \x{B0}?\s?(N|S)                                 # sign last
    [,;]?\s
    (180(\.0{1,8})?|(1[0-7][0-9]|[1-9][0-9]|[0-9])(\.[0-9]{1,8})?)
    \x{B0}?\s?(E|W)
)
)";

/// ISO 6709 latitude: DD.D, DDMM.M or DDMMSS.S with a mandatory sign.
const LAT6709: &str = r"(?x)
(?:
[+\-\x{2212}]
(90
    (
        (\.0{1,8})?
        |(00(\.[0]{1,6})?)
        |(0000(\.[0]{1,4})?)
    )
|[0-8][0-9]
    (
        (\.[0-9]{1,8})?
        |([0-5][0-9](\.[0-9]{1,6})?)
        |(([0-5][0-9]){2}(\.[0-9]{1,4})?)
    )
)
)";

const LON6709: &str = r"(?x)
(?:
[+\-\x{2212}]
(
    (180
        (
            (\.0{1,8})?
            |(00(\.[0]{1,6})?)
            |(0000(\.[0]{1,4})?)
        )
    |(1[0-7][0-9]|0[0-9]{2})
        (
            (\.[0-9]{1,8})?
            |([0-5][0-9](\.[0-9]{1,6})?)
            |(([0-5][0-9]){2}(\.[0-9]{1,4})?)
        )
    )
)
)";

const LATLON6709: &str = r"(?x)
(?:
[+\-\x{2212}]
(
(90(\.0{1,8})?|[0-8][0-9](\.[0-9]{1,8})?)                                   # DD.D
[+\-\x{2212}]
(180(\.0{1,8})?|(1[0-7][0-9]|0[0-9]{2})(\.[0-9]{1,8})?)                     # DDD.D
|
(9000(\.0{1,6})?|[0-8][0-9][0-5][0-9](\.[0-9]{1,6})?)                       # DDMM.M
[+\-\x{2212}]
(18000(\.0{1,6})?|(1[0-7][0-9]|0[0-9]{2})[0-5][0-9](\.[0-9]{1,6})?)         # DDDMM.M
|
(900000(\.0{1,4})?|[0-8][0-9]([0-5][0-9]){2}(\.[0-9]{1,4})?)                # DDMMSS.S
([+\-\x{2212}])
(1800000(\.0{1,4})?|(1[0-7][0-9]|0[0-9]{2})([0-5][0-9]){2}(\.[0-9]{1,4})?)  # DDDMMSS.S
)
# elevation suffix not supported
)";

const CREDITCARD: &str = r"(?x)
(?:
 (?:9792[0-9]{12})                          # troy
|(?:3[05689][0-9]{12,17})                   # diners, jcb
|(?:2[01][0-9]{13})                         # old diners
|(?:1[0-9]{14})                             # uatp
|(?:4[0-9]{12,18})                          # visa and co-branded
|(?:3[47][0-9]{13})                         # amex
|(?:(?:5[06789]|6[0-9])[0-9]{10,17})        # maestro, discover and others
|(?:(?:5[12345]|2[2-7])[0-9]{14})           # mastercard
)";

// Spaces inside classes are written `\x{20}`; verbose mode would drop them.
const CREDITCARD_PLUS: &str = r"(?x)
(?:
 (?:9792(?:[-\x{20}]?[0-9]{4}){3})                              # troy
|(?:3[05689][-\x{20}0-9]{12,21})                                # diners, jcb
|(?:2[01][-\x{20}0-9]{13,16})                                   # old diners
|(?:1[0-9]{3}[-\x{20}]?[0-9]{5}[-\x{20}][0-9]{6})               # uatp
|(?:4[-\x{20}0-9]{12,22})                                       # visa and co-branded
|(?:3[47][0-9]{2}[-\x{20}]?[0-9]{6}[-\x{20}]?[0-9]{5})          # amex
|(?:(?:5[06789]|6[0-9])[-\x{20}0-9]{10,21})                     # maestro, discover and others
|(?:(?:5[12345]|2[2-7])[0-9]{2}(?:[-\x{20}]?[0-9]{4}){3})       # mastercard
)";

/// Identifier and pattern of every regex-backed built-in, in registration order.
pub const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("yyyymmdd", r"(?:19|20)[0-9]{2}[-/](?:0?[1-9]|1[012])[-/](?:0?[1-9]|[12][0-9]|3[01])"),
    ("mmddyyyy", r"(?:0?[1-9]|1[012])[-/](?:0?[1-9]|[12][0-9]|3[01])[-/](?:19|20)?[0-9]{2}"),
    (
        "mdyorymd",
        r"(?:(?:19|20)[0-9]{2}[-/](?:0?[1-9]|1[012])[-/](?:0?[1-9]|[12][0-9]|3[01]))|(?:(?:0?[1-9]|1[012])[-/](?:0?[1-9]|[12][0-9]|3[01])[-/](?:19|20)?[0-9]{2})",
    ),
    ("mmyyyy", r"(?:0?[1-9]|1[012])[-/](?:19|20)?[0-9]{2}"),
    ("year", r"(?:19|20)[0-9]{2}"),
    ("ssn", r"(?:[0-9]{3}-[0-9]{2}-[0-9]{4})|(?:[0-9]{9})"),
    (
        "phone",
        r"(?:(?:1[-. ]?)?(?:(?:\([0-9]{3}\)|[0-9]{3})[-. ]?))?[0-9]{3}[-.]?[0-9]{4}(?:(?:[, ][ ]?|[, ]?[ ]?x|[, ]?[ ]?ext[.]?[ ]?)[0-9]{1,5})?",
    ),
    (
        "ipaddress",
        r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)",
    ),
    ("notation", r"[+-]?[0-9](\.[0-9]+)?[Ee][+-]?[0-9]+"),
    ("zipcode+", r"[0-9]{5}(?:-[0-9]{4})?"),
    (
        "ip+port",
        r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)(?::[0-9]{1,5})?",
    ),
    (
        "ip+cidr",
        r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)(?:/(3[012]|[21][0-9]|[0-9]))?",
    ),
    ("digit", r"(?:[1-9][0-9]*)|0"),
    ("integer", r"(?:[-+]?[1-9][0-9]*)|0"),
    ("number", r"(?:[0-9]{1,3},(?:[0-9]{3},)*[0-9]{3})|(?:[0-9]{1,3})|[0-9]+"),
    ("Abbrev", r"[a-zA-Z]+\."),
    (
        "decimal",
        r"[-+(]?(?:(?:\.[0-9]+)|((?:[0-9]+)|(?:(?:(?:[0-9]{1,3},(?:[0-9]{3},)*[0-9]{3})|(?:[0-9]{1,3}))))(?:\.[0-9]*)?)[)]?",
    ),
    ("Name", r#"[-a-zA-Z0-9'" .,]+"#),
    ("alpha", r"[a-z]+"),
    ("ALPHA", r"[A-Z]+"),
    ("Alpha", r"[a-zA-Z]+"),
    ("Alpha+", r"#?[a-zA-Z]+(?:[-_.(/]?[a-zA-Z][)]?)*"),
    ("ALPHANUMERIC", r"[A-Z0-9]+"),
    ("alphanumeric", r"[a-z0-9]+"),
    ("Alphanumeric", r"[a-zA-Z0-9]+"),
    ("Alphanumeric+", r"#?[a-zA-Z0-9]+(?:[-_.(/]?[a-zA-Z0-9]+[)]?)*"),
    ("ALPHANUMERIC+", r"#?[A-Z0-9]+(?:[-_.(/]?[A-Z0-9]+[)]?)*"),
    ("numeric", r"[0-9]+"),
    ("Username", r"[a-zA-Z][-a-zA-Z0-9_]{1,15}"),
    ("Address", r"[-a-zA-Z0-9 .,()/]+"),
    (
        "dollar",
        r"[-+(]?\$(?:(?:\.[0-9]{2})|((?:[0-9]+)|(?:(?:(?:[0-9]{1,3},(?:[0-9]{3},)*[0-9]{3})|(?:[0-9]{1,3}))))(?:\.[0-9]{2})?)[)]?",
    ),
    ("@Twitter", r"@[0-9A-Za-z_]{1,15}"),
    ("@Twitter+", r"@[0-9A-Za-z_]{1,15}(?:(?: |, ?)@[0-9A-Za-z_]{1,15})*"),
    ("#Twitter", r"#[a-zA-Z0-9_]+"),
    ("#Twitter+", r"#[a-zA-Z0-9_]+(?:(?: |, ?)#[a-zA-Z0-9_]+)*"),
    ("percent", r"(?:[1-9][0-9]*|0)%"),
    ("percent+", r"(?:(?:[1-9][0-9]*|0)(?:[.][0-9]+)?|(?:[.][0-9]+))%"),
    ("time", r"(?:1[0-2]|0?[1-9])(?::[0-5][0-9]){0,2} ?(?:AM|a.m.|PM|p.m.)?"),
    ("time24", r"(?:[0-1]?[0-9]|2[0-3])(?::[0-5][0-9]){1,2}"),
    (
        "Email",
        r"[-a-zA-Z0-9._%+!#$&'*/=?^`{|}~]{1,64}@[-a-zA-Z0-9.]+\.[a-zA-Z]{2,}",
    ),
    (
        "Website",
        r"((https?|ftp)://)?([-0-9A-Za-z_]+\.)+[a-zA-Z]{2,}(?::[0-9]{1,5})?[-0-9A-Za-z_/+=#%&.~?]*",
    ),
    ("ccnumber", r"[0-9]{12,19}"),
    ("ccnumber+", r"[0-9][- 0-9]{11,22}"),
    ("creditcard", CREDITCARD),
    ("creditcard+", CREDITCARD_PLUS),
    ("lat", LAT),
    ("lon", LON),
    ("latlon", LATLON),
    ("latdec", LATDEC),
    ("londec", LONDEC),
    ("latlondec", LATLONDEC),
    ("lat6709", LAT6709),
    ("lon6709", LON6709),
    ("latlon6709", LATLON6709),
    ("Sentence", r"[\x20-\x2a\x2c-\x3b\x3f-\x5a\x61-\x7a]+"),
    ("ASCII", r"[\x20-\x7e]+"),
    ("Latin1", r"[\x20-\x7e\xa0-\xff]+"),
    (
        "Windows",
        r"[\x20-\x7e\xa0-\xff\x{152}\x{153}\x{160}\x{161}\x{178}\x{17D}\x{17E}\x{192}\x{2C6}\x{2DC}\x{2013}\x{2014}\x{2018}-\x{201A}\x{201C}-\x{201E}\x{2020}-\x{2022}\x{2026}\x{2030}\x{2039}\x{203A}\x{20AC}\x{2122}]+",
    ),
];

/// Every built-in compiled once per process; registries share the `Arc`s.
pub(crate) static BUILTINS: Lazy<Vec<(&'static str, Arc<Predicate>)>> = Lazy::new(|| {
    let primitive = |name: &'static str| {
        Primitive::ALL
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(n, p)| (*n, Arc::new(Predicate::Primitive(*p))))
    };

    let mut all = Vec::new();
    all.extend(["nothing", "something", "anything", "int", "float"].into_iter().filter_map(primitive));
    for (name, pattern) in BUILTIN_PATTERNS {
        let regex = RegexTest::compile(name, pattern).expect("built-in pattern compiles");
        all.push((*name, Arc::new(Predicate::Regex(regex))));
    }
    for (name, p) in Primitive::ALL.iter().skip(5) {
        all.push((*name, Arc::new(Predicate::Primitive(*p))));
    }
    all
});
