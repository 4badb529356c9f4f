//! Glyph names mapped to Unicode.
//!
//! A subset of the Adobe Glyph List covering the Latin, Symbol and common
//! typographic names used by the standard encodings. Sorted by name for
//! binary search.

pub(crate) const GLYPHS: &[(&str, char)] = &[
    ("A", 'A'),
    ("AE", '\u{00C6}'),
    ("Aacute", '\u{00C1}'),
    ("Abreve", '\u{0102}'),
    ("Acircumflex", '\u{00C2}'),
    ("Adieresis", '\u{00C4}'),
    ("Agrave", '\u{00C0}'),
    ("Alpha", '\u{0391}'),
    ("Alphatonos", '\u{0386}'),
    ("Amacron", '\u{0100}'),
    ("Aogonek", '\u{0104}'),
    ("Aring", '\u{00C5}'),
    ("Atilde", '\u{00C3}'),
    ("B", 'B'),
    ("Beta", '\u{0392}'),
    ("C", 'C'),
    ("Cacute", '\u{0106}'),
    ("Ccaron", '\u{010C}'),
    ("Ccedilla", '\u{00C7}'),
    ("Chi", '\u{03A7}'),
    ("D", 'D'),
    ("Dcaron", '\u{010E}'),
    ("Dcroat", '\u{0110}'),
    ("Delta", '\u{2206}'),
    ("E", 'E'),
    ("Eacute", '\u{00C9}'),
    ("Ecaron", '\u{011A}'),
    ("Ecircumflex", '\u{00CA}'),
    ("Edieresis", '\u{00CB}'),
    ("Edotaccent", '\u{0116}'),
    ("Egrave", '\u{00C8}'),
    ("Emacron", '\u{0112}'),
    ("Eng", '\u{014A}'),
    ("Eogonek", '\u{0118}'),
    ("Epsilon", '\u{0395}'),
    ("Epsilontonos", '\u{0388}'),
    ("Eta", '\u{0397}'),
    ("Etatonos", '\u{0389}'),
    ("Eth", '\u{00D0}'),
    ("Euro", '\u{20AC}'),
    ("F", 'F'),
    ("G", 'G'),
    ("Gamma", '\u{0393}'),
    ("Gbreve", '\u{011E}'),
    ("Gcommaaccent", '\u{0122}'),
    ("H", 'H'),
    ("H18533", '\u{25CF}'),
    ("H18543", '\u{25AA}'),
    ("H18551", '\u{25AB}'),
    ("H22073", '\u{25A1}'),
    ("Hbar", '\u{0126}'),
    ("I", 'I'),
    ("IJ", '\u{0132}'),
    ("Iacute", '\u{00CD}'),
    ("Icircumflex", '\u{00CE}'),
    ("Idieresis", '\u{00CF}'),
    ("Idotaccent", '\u{0130}'),
    ("Ifraktur", '\u{2111}'),
    ("Igrave", '\u{00CC}'),
    ("Imacron", '\u{012A}'),
    ("Iogonek", '\u{012E}'),
    ("Iota", '\u{0399}'),
    ("Iotatonos", '\u{038A}'),
    ("J", 'J'),
    ("K", 'K'),
    ("Kappa", '\u{039A}'),
    ("Kcommaaccent", '\u{0136}'),
    ("L", 'L'),
    ("Lacute", '\u{0139}'),
    ("Lambda", '\u{039B}'),
    ("Lcaron", '\u{013D}'),
    ("Lcommaaccent", '\u{013B}'),
    ("Ldot", '\u{013F}'),
    ("Lslash", '\u{0141}'),
    ("M", 'M'),
    ("Mu", '\u{039C}'),
    ("N", 'N'),
    ("Nacute", '\u{0143}'),
    ("Ncaron", '\u{0147}'),
    ("Ncommaaccent", '\u{0145}'),
    ("Ntilde", '\u{00D1}'),
    ("Nu", '\u{039D}'),
    ("O", 'O'),
    ("OE", '\u{0152}'),
    ("Oacute", '\u{00D3}'),
    ("Ocircumflex", '\u{00D4}'),
    ("Odieresis", '\u{00D6}'),
    ("Ograve", '\u{00D2}'),
    ("Ohm", '\u{2126}'),
    ("Ohungarumlaut", '\u{0150}'),
    ("Omacron", '\u{014C}'),
    ("Omega", '\u{2126}'),
    ("Omegatonos", '\u{038F}'),
    ("Omicron", '\u{039F}'),
    ("Omicrontonos", '\u{038C}'),
    ("Oslash", '\u{00D8}'),
    ("Otilde", '\u{00D5}'),
    ("P", 'P'),
    ("Phi", '\u{03A6}'),
    ("Pi", '\u{03A0}'),
    ("Psi", '\u{03A8}'),
    ("Q", 'Q'),
    ("R", 'R'),
    ("Racute", '\u{0154}'),
    ("Rcaron", '\u{0158}'),
    ("Rcommaaccent", '\u{0156}'),
    ("Rfraktur", '\u{211C}'),
    ("Rho", '\u{03A1}'),
    ("S", 'S'),
    ("SF010000", '\u{250C}'),
    ("SF020000", '\u{2514}'),
    ("SF030000", '\u{2510}'),
    ("SF040000", '\u{2518}'),
    ("SF100000", '\u{2500}'),
    ("SF110000", '\u{2502}'),
    ("Sacute", '\u{015A}'),
    ("Scaron", '\u{0160}'),
    ("Scedilla", '\u{015E}'),
    ("Scommaaccent", '\u{0218}'),
    ("Sigma", '\u{03A3}'),
    ("T", 'T'),
    ("Tau", '\u{03A4}'),
    ("Tbar", '\u{0166}'),
    ("Tcaron", '\u{0164}'),
    ("Tcommaaccent", '\u{0162}'),
    ("Theta", '\u{0398}'),
    ("Thorn", '\u{00DE}'),
    ("U", 'U'),
    ("Uacute", '\u{00DA}'),
    ("Ucircumflex", '\u{00DB}'),
    ("Udieresis", '\u{00DC}'),
    ("Ugrave", '\u{00D9}'),
    ("Uhungarumlaut", '\u{0170}'),
    ("Umacron", '\u{016A}'),
    ("Uogonek", '\u{0172}'),
    ("Upsilon", '\u{03A5}'),
    ("Upsilon1", '\u{03D2}'),
    ("Upsilontonos", '\u{038E}'),
    ("Uring", '\u{016E}'),
    ("V", 'V'),
    ("W", 'W'),
    ("X", 'X'),
    ("Xi", '\u{039E}'),
    ("Y", 'Y'),
    ("Yacute", '\u{00DD}'),
    ("Ydieresis", '\u{0178}'),
    ("Z", 'Z'),
    ("Zacute", '\u{0179}'),
    ("Zcaron", '\u{017D}'),
    ("Zdotaccent", '\u{017B}'),
    ("Zeta", '\u{0396}'),
    ("a", 'a'),
    ("aacute", '\u{00E1}'),
    ("abreve", '\u{0103}'),
    ("acircumflex", '\u{00E2}'),
    ("acute", '\u{00B4}'),
    ("adieresis", '\u{00E4}'),
    ("ae", '\u{00E6}'),
    ("afii00208", '\u{2015}'),
    ("afii61352", '\u{2116}'),
    ("agrave", '\u{00E0}'),
    ("aleph", '\u{2135}'),
    ("alpha", '\u{03B1}'),
    ("alphatonos", '\u{03AC}'),
    ("amacron", '\u{0101}'),
    ("ampersand", '&'),
    ("angle", '\u{2220}'),
    ("angleleft", '\u{2329}'),
    ("angleright", '\u{232A}'),
    ("aogonek", '\u{0105}'),
    ("apple", '\u{F8FF}'),
    ("approxequal", '\u{2248}'),
    ("aring", '\u{00E5}'),
    ("arrowboth", '\u{2194}'),
    ("arrowdblboth", '\u{21D4}'),
    ("arrowdbldown", '\u{21D3}'),
    ("arrowdblleft", '\u{21D0}'),
    ("arrowdblright", '\u{21D2}'),
    ("arrowdblup", '\u{21D1}'),
    ("arrowdown", '\u{2193}'),
    ("arrowhorizex", '\u{F8E7}'),
    ("arrowleft", '\u{2190}'),
    ("arrowright", '\u{2192}'),
    ("arrowup", '\u{2191}'),
    ("arrowupdn", '\u{2195}'),
    ("arrowvertex", '\u{F8E6}'),
    ("asciicircum", '^'),
    ("asciitilde", '~'),
    ("asterisk", '*'),
    ("asteriskmath", '\u{2217}'),
    ("at", '@'),
    ("atilde", '\u{00E3}'),
    ("b", 'b'),
    ("backslash", '\\'),
    ("bar", '|'),
    ("beta", '\u{03B2}'),
    ("blackcircle", '\u{25CF}'),
    ("blacksquare", '\u{25A0}'),
    ("block", '\u{2588}'),
    ("braceex", '\u{F8F4}'),
    ("braceleft", '{'),
    ("braceleftbt", '\u{F8F3}'),
    ("braceleftmid", '\u{F8F2}'),
    ("bracelefttp", '\u{F8F1}'),
    ("braceright", '}'),
    ("bracerightbt", '\u{F8FE}'),
    ("bracerightmid", '\u{F8FD}'),
    ("bracerighttp", '\u{F8FC}'),
    ("bracketleft", '['),
    ("bracketleftbt", '\u{F8F0}'),
    ("bracketleftex", '\u{F8EF}'),
    ("bracketlefttp", '\u{F8EE}'),
    ("bracketright", ']'),
    ("bracketrightbt", '\u{F8FB}'),
    ("bracketrightex", '\u{F8FA}'),
    ("bracketrighttp", '\u{F8F9}'),
    ("breve", '\u{02D8}'),
    ("brokenbar", '\u{00A6}'),
    ("bullet", '\u{2022}'),
    ("c", 'c'),
    ("cacute", '\u{0107}'),
    ("careof", '\u{2105}'),
    ("caron", '\u{02C7}'),
    ("carriagereturn", '\u{21B5}'),
    ("ccaron", '\u{010D}'),
    ("ccedilla", '\u{00E7}'),
    ("cedilla", '\u{00B8}'),
    ("cent", '\u{00A2}'),
    ("chi", '\u{03C7}'),
    ("circle", '\u{25CB}'),
    ("circlemultiply", '\u{2297}'),
    ("circleplus", '\u{2295}'),
    ("circumflex", '\u{02C6}'),
    ("club", '\u{2663}'),
    ("colon", ':'),
    ("comma", ','),
    ("commaaccent", '\u{F6C3}'),
    ("congruent", '\u{2245}'),
    ("copyright", '\u{00A9}'),
    ("copyrightsans", '\u{F8E9}'),
    ("copyrightserif", '\u{F6D9}'),
    ("currency", '\u{00A4}'),
    ("d", 'd'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("dcaron", '\u{010F}'),
    ("dcroat", '\u{0111}'),
    ("degree", '\u{00B0}'),
    ("delta", '\u{03B4}'),
    ("diamond", '\u{2666}'),
    ("dieresis", '\u{00A8}'),
    ("dieresistonos", '\u{0385}'),
    ("divide", '\u{00F7}'),
    ("dkshade", '\u{2593}'),
    ("dnblock", '\u{2584}'),
    ("dollar", '$'),
    ("dong", '\u{20AB}'),
    ("dotaccent", '\u{02D9}'),
    ("dotlessi", '\u{0131}'),
    ("dotlessj", '\u{0237}'),
    ("dotmath", '\u{22C5}'),
    ("e", 'e'),
    ("eacute", '\u{00E9}'),
    ("ecaron", '\u{011B}'),
    ("ecircumflex", '\u{00EA}'),
    ("edieresis", '\u{00EB}'),
    ("edotaccent", '\u{0117}'),
    ("egrave", '\u{00E8}'),
    ("eight", '8'),
    ("eightinferior", '\u{2088}'),
    ("eightsuperior", '\u{2078}'),
    ("element", '\u{2208}'),
    ("ellipsis", '\u{2026}'),
    ("emacron", '\u{0113}'),
    ("emdash", '\u{2014}'),
    ("emptyset", '\u{2205}'),
    ("endash", '\u{2013}'),
    ("eng", '\u{014B}'),
    ("eogonek", '\u{0119}'),
    ("epsilon", '\u{03B5}'),
    ("epsilontonos", '\u{03AD}'),
    ("equal", '='),
    ("equivalence", '\u{2261}'),
    ("estimated", '\u{212E}'),
    ("eta", '\u{03B7}'),
    ("etatonos", '\u{03AE}'),
    ("eth", '\u{00F0}'),
    ("exclam", '!'),
    ("exclamdbl", '\u{203C}'),
    ("exclamdown", '\u{00A1}'),
    ("existential", '\u{2203}'),
    ("f", 'f'),
    ("female", '\u{2640}'),
    ("ff", '\u{FB00}'),
    ("ffi", '\u{FB03}'),
    ("ffl", '\u{FB04}'),
    ("fi", '\u{FB01}'),
    ("figuredash", '\u{2012}'),
    ("filledbox", '\u{25A0}'),
    ("filledrect", '\u{25AC}'),
    ("five", '5'),
    ("fiveeighths", '\u{215D}'),
    ("fiveinferior", '\u{2085}'),
    ("fivesuperior", '\u{2075}'),
    ("fl", '\u{FB02}'),
    ("florin", '\u{0192}'),
    ("four", '4'),
    ("fourinferior", '\u{2084}'),
    ("foursuperior", '\u{2074}'),
    ("fraction", '\u{2044}'),
    ("franc", '\u{20A3}'),
    ("g", 'g'),
    ("gamma", '\u{03B3}'),
    ("gbreve", '\u{011F}'),
    ("gcommaaccent", '\u{0123}'),
    ("germandbls", '\u{00DF}'),
    ("gradient", '\u{2207}'),
    ("grave", '`'),
    ("greater", '>'),
    ("greaterequal", '\u{2265}'),
    ("guillemotleft", '\u{00AB}'),
    ("guillemotright", '\u{00BB}'),
    ("guilsinglleft", '\u{2039}'),
    ("guilsinglright", '\u{203A}'),
    ("h", 'h'),
    ("hbar", '\u{0127}'),
    ("heart", '\u{2665}'),
    ("house", '\u{2302}'),
    ("hungarumlaut", '\u{02DD}'),
    ("hyphen", '-'),
    ("i", 'i'),
    ("iacute", '\u{00ED}'),
    ("icircumflex", '\u{00EE}'),
    ("idieresis", '\u{00EF}'),
    ("igrave", '\u{00EC}'),
    ("ij", '\u{0133}'),
    ("imacron", '\u{012B}'),
    ("increment", '\u{2206}'),
    ("infinity", '\u{221E}'),
    ("integral", '\u{222B}'),
    ("integralbt", '\u{2321}'),
    ("integralex", '\u{F8F5}'),
    ("integraltp", '\u{2320}'),
    ("intersection", '\u{2229}'),
    ("invbullet", '\u{25D8}'),
    ("invcircle", '\u{25D9}'),
    ("invsmileface", '\u{263B}'),
    ("iogonek", '\u{012F}'),
    ("iota", '\u{03B9}'),
    ("iotadieresis", '\u{03CA}'),
    ("iotatonos", '\u{03AF}'),
    ("j", 'j'),
    ("k", 'k'),
    ("kappa", '\u{03BA}'),
    ("kcommaaccent", '\u{0137}'),
    ("kgreenlandic", '\u{0138}'),
    ("l", 'l'),
    ("lacute", '\u{013A}'),
    ("lambda", '\u{03BB}'),
    ("lcaron", '\u{013E}'),
    ("lcommaaccent", '\u{013C}'),
    ("ldot", '\u{0140}'),
    ("less", '<'),
    ("lessequal", '\u{2264}'),
    ("lfblock", '\u{258C}'),
    ("lira", '\u{20A4}'),
    ("logicaland", '\u{2227}'),
    ("logicalnot", '\u{00AC}'),
    ("logicalor", '\u{2228}'),
    ("longs", '\u{017F}'),
    ("lozenge", '\u{25CA}'),
    ("lslash", '\u{0142}'),
    ("ltshade", '\u{2591}'),
    ("m", 'm'),
    ("macron", '\u{00AF}'),
    ("male", '\u{2642}'),
    ("micro", '\u{00B5}'),
    ("minus", '\u{2212}'),
    ("minute", '\u{2032}'),
    ("mu", '\u{03BC}'),
    ("multiply", '\u{00D7}'),
    ("musicalnote", '\u{266A}'),
    ("musicalnotedbl", '\u{266B}'),
    ("n", 'n'),
    ("nacute", '\u{0144}'),
    ("napostrophe", '\u{0149}'),
    ("nbspace", '\u{00A0}'),
    ("ncaron", '\u{0148}'),
    ("ncommaaccent", '\u{0146}'),
    ("nine", '9'),
    ("nineinferior", '\u{2089}'),
    ("ninesuperior", '\u{2079}'),
    ("notelement", '\u{2209}'),
    ("notequal", '\u{2260}'),
    ("notsubset", '\u{2284}'),
    ("nsuperior", '\u{207F}'),
    ("ntilde", '\u{00F1}'),
    ("nu", '\u{03BD}'),
    ("numbersign", '#'),
    ("o", 'o'),
    ("oacute", '\u{00F3}'),
    ("ocircumflex", '\u{00F4}'),
    ("odieresis", '\u{00F6}'),
    ("oe", '\u{0153}'),
    ("ogonek", '\u{02DB}'),
    ("ograve", '\u{00F2}'),
    ("ohungarumlaut", '\u{0151}'),
    ("omacron", '\u{014D}'),
    ("omega", '\u{03C9}'),
    ("omega1", '\u{03D6}'),
    ("omegatonos", '\u{03CE}'),
    ("omicron", '\u{03BF}'),
    ("omicrontonos", '\u{03CC}'),
    ("one", '1'),
    ("oneeighth", '\u{215B}'),
    ("onehalf", '\u{00BD}'),
    ("oneinferior", '\u{2081}'),
    ("onequarter", '\u{00BC}'),
    ("onesuperior", '\u{00B9}'),
    ("onethird", '\u{2153}'),
    ("openbullet", '\u{25E6}'),
    ("ordfeminine", '\u{00AA}'),
    ("ordmasculine", '\u{00BA}'),
    ("oslash", '\u{00F8}'),
    ("otilde", '\u{00F5}'),
    ("p", 'p'),
    ("paragraph", '\u{00B6}'),
    ("parenleft", '('),
    ("parenleftbt", '\u{F8ED}'),
    ("parenleftex", '\u{F8EC}'),
    ("parenlefttp", '\u{F8EB}'),
    ("parenright", ')'),
    ("parenrightbt", '\u{F8F8}'),
    ("parenrightex", '\u{F8F7}'),
    ("parenrighttp", '\u{F8F6}'),
    ("partialdiff", '\u{2202}'),
    ("percent", '%'),
    ("period", '.'),
    ("periodcentered", '\u{00B7}'),
    ("perpendicular", '\u{22A5}'),
    ("perthousand", '\u{2030}'),
    ("peseta", '\u{20A7}'),
    ("phi", '\u{03C6}'),
    ("phi1", '\u{03D5}'),
    ("pi", '\u{03C0}'),
    ("plus", '+'),
    ("plusminus", '\u{00B1}'),
    ("product", '\u{220F}'),
    ("propersubset", '\u{2282}'),
    ("propersuperset", '\u{2283}'),
    ("proportional", '\u{221D}'),
    ("psi", '\u{03C8}'),
    ("q", 'q'),
    ("question", '?'),
    ("questiondown", '\u{00BF}'),
    ("quotedbl", '"'),
    ("quotedblbase", '\u{201E}'),
    ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'),
    ("quoteleft", '\u{2018}'),
    ("quotereversed", '\u{201B}'),
    ("quoteright", '\u{2019}'),
    ("quotesinglbase", '\u{201A}'),
    ("quotesingle", '\''),
    ("r", 'r'),
    ("racute", '\u{0155}'),
    ("radical", '\u{221A}'),
    ("radicalex", '\u{F8E5}'),
    ("rcaron", '\u{0159}'),
    ("rcommaaccent", '\u{0157}'),
    ("reflexsubset", '\u{2286}'),
    ("reflexsuperset", '\u{2287}'),
    ("registered", '\u{00AE}'),
    ("registersans", '\u{F8E8}'),
    ("registerserif", '\u{F6DA}'),
    ("revlogicalnot", '\u{2310}'),
    ("rho", '\u{03C1}'),
    ("ring", '\u{02DA}'),
    ("rtblock", '\u{2590}'),
    ("s", 's'),
    ("sacute", '\u{015B}'),
    ("scaron", '\u{0161}'),
    ("scedilla", '\u{015F}'),
    ("scommaaccent", '\u{0219}'),
    ("second", '\u{2033}'),
    ("section", '\u{00A7}'),
    ("semicolon", ';'),
    ("seven", '7'),
    ("seveneighths", '\u{215E}'),
    ("seveninferior", '\u{2087}'),
    ("sevensuperior", '\u{2077}'),
    ("sfthyphen", '\u{00AD}'),
    ("shade", '\u{2592}'),
    ("sigma", '\u{03C3}'),
    ("sigma1", '\u{03C2}'),
    ("similar", '\u{223C}'),
    ("six", '6'),
    ("sixinferior", '\u{2086}'),
    ("sixsuperior", '\u{2076}'),
    ("slash", '/'),
    ("smileface", '\u{263A}'),
    ("space", '\u{0020}'),
    ("spade", '\u{2660}'),
    ("square", '\u{25A1}'),
    ("sterling", '\u{00A3}'),
    ("suchthat", '\u{220B}'),
    ("summation", '\u{2211}'),
    ("sun", '\u{263C}'),
    ("t", 't'),
    ("tau", '\u{03C4}'),
    ("tbar", '\u{0167}'),
    ("tcaron", '\u{0165}'),
    ("tcommaaccent", '\u{0163}'),
    ("therefore", '\u{2234}'),
    ("theta", '\u{03B8}'),
    ("theta1", '\u{03D1}'),
    ("thorn", '\u{00FE}'),
    ("three", '3'),
    ("threeeighths", '\u{215C}'),
    ("threeinferior", '\u{2083}'),
    ("threequarters", '\u{00BE}'),
    ("threesuperior", '\u{00B3}'),
    ("tilde", '\u{02DC}'),
    ("tonos", '\u{0384}'),
    ("trademark", '\u{2122}'),
    ("trademarksans", '\u{F8EA}'),
    ("trademarkserif", '\u{F6DB}'),
    ("triagdn", '\u{25BC}'),
    ("triaglf", '\u{25C4}'),
    ("triagrt", '\u{25BA}'),
    ("triagup", '\u{25B2}'),
    ("two", '2'),
    ("twoinferior", '\u{2082}'),
    ("twosuperior", '\u{00B2}'),
    ("twothirds", '\u{2154}'),
    ("u", 'u'),
    ("uacute", '\u{00FA}'),
    ("ucircumflex", '\u{00FB}'),
    ("udieresis", '\u{00FC}'),
    ("ugrave", '\u{00F9}'),
    ("uhungarumlaut", '\u{0171}'),
    ("umacron", '\u{016B}'),
    ("underscore", '_'),
    ("union", '\u{222A}'),
    ("universal", '\u{2200}'),
    ("uogonek", '\u{0173}'),
    ("upblock", '\u{2580}'),
    ("upsilon", '\u{03C5}'),
    ("upsilondieresis", '\u{03CB}'),
    ("upsilontonos", '\u{03CD}'),
    ("uring", '\u{016F}'),
    ("v", 'v'),
    ("w", 'w'),
    ("weierstrass", '\u{2118}'),
    ("whitecircle", '\u{25CB}'),
    ("x", 'x'),
    ("xi", '\u{03BE}'),
    ("y", 'y'),
    ("yacute", '\u{00FD}'),
    ("ydieresis", '\u{00FF}'),
    ("yen", '\u{00A5}'),
    ("z", 'z'),
    ("zacute", '\u{017A}'),
    ("zcaron", '\u{017E}'),
    ("zdotaccent", '\u{017C}'),
    ("zero", '0'),
    ("zeroinferior", '\u{2080}'),
    ("zerosuperior", '\u{2070}'),
    ("zeta", '\u{03B6}'),
];
