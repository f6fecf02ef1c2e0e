//! Contract vocabulary per locale. Pure data, compiled by `patterns`.

pub struct Lexicon {
    pub locale: &'static str,
    pub months: &'static [&'static str],
    pub stopwords: &'static [&'static str],
    pub excluded_phrases: &'static [&'static str],
    pub clause_indicators: &'static [&'static str],
    pub roles: &'static [&'static str],
}

/// Legal-entity forms accepted as an organization suffix (or prefix, for the
/// Russian ones).
pub const LEGAL_SUFFIXES: &[&str] = &[
    "ООО", "Inc.", "Ltd.", "LLC", "GmbH", "АО", "ЗАО", "ОАО", "ПАО", "ИП", "Co., Ltd.",
];

/// Forms that precede the name in Russian usage: `ООО «Ромашка»`.
pub const LEGAL_PREFIXES: &[&str] = &["ООО", "ЗАО", "ОАО", "ПАО", "АО", "ИП"];

pub const EN: Lexicon = Lexicon {
    locale: "en",
    months: &[
        "January", "February", "March", "April", "May", "June", "July", "August",
        "September", "October", "November", "December", "Jan", "Feb", "Mar", "Apr",
        "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    stopwords: &[
        "contract", "party", "parties", "the articles of association", "specifications",
        "undertakes", "provide", "is", "shall", "has", "to", "in", "and", "with", "by",
        "at", "on", "from", "acting", "represented", "russia", "petersburg", "saint",
        "sankt", "saint-petersburg", "st.", "st", "force", "majeure", "general", "terms",
        "procedure", "delivery", "goods", "claim", "pretension", "conditions", "including",
        "breach", "termination", "dispute", "military", "operation", "export",
        "contingencies", "mail", "copies", "present", "one", "each",
    ],
    excluded_phrases: &[
        "have concluded the present",
        "subject of the",
        "during the term of this",
        "as per the",
        "of this",
        "as реr packing",
        "upon receipt of a",
        "the claim must specify the nature of",
        "date of",
        "s representative",
        "this act should be made not late than",
        "including the cost of the examination of the",
        "as well as risks of accidental loss",
        "force majeure",
        "acts of",
        "breach or termination thereof",
        "mail copies of the present",
        "general terms",
        "incoterms",
        "specification",
        "specifications",
        "articles of association",
        "contract",
        "upon receipt of",
        "requisites",
        "in case of",
        "drawn up by",
        "with the participation",
        "exchange rates are",
        "represented by",
        "unless otherwise agreed",
        "from supplier to buyer",
        "this contract",
        "by the parties",
        "of the supplier",
        "of the buyer",
        "chamber of commerce",
        "hong kong international arbitration centre",
    ],
    clause_indicators: &[],
    roles: &["Supplier", "Buyer", "Customer", "Contractor", "Vendor"],
};

pub const RU: Lexicon = Lexicon {
    locale: "ru",
    months: &[
        "январь", "февраль", "март", "апрель", "май", "июнь", "июль", "август",
        "сентябрь", "октябрь", "ноябрь", "декабрь",
        "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа",
        "сентября", "октября", "ноября", "декабря",
    ],
    stopwords: &[
        "покупатель", "поставщик", "стороны", "сторона", "спецификациями", "договор",
        "договора", "по", "указанным", "на основании", "обязуется", "предоставить",
        "расходы", "акт", "условиями", "момента", "претензии", "качества", "дней",
        "поставки", "товара", "период", "обязан", "существования", "право",
        "собственность", "товар", "момент", "передачи", "претензия", "качество",
        "стоимость", "общие", "условия", "приложения", "нарушение", "спор", "арбитраж",
        "правилами", "согласно", "упаковочному",
    ],
    excluded_phrases: &[
        "с одной",
        "с другой",
        "в дальнейшем вместе",
        "именуемое",
        "в лице",
        "действующего на основании",
        "заключили настоящий",
        "спецификации к",
        "право собственности на",
        "а также риски случайной гибели",
        "согласно упаковочному",
        "если вышеперечисленные непредвиденные обстоятельства",
        "подписанные обеими сторонами",
        "претензия должна содержать",
        "общие условия",
        "все дополнения и приложения",
        "спецификация",
        "спецификациях",
        "устав",
        "договор",
        "согласованными сторонами",
        "выданные торговой палатой государства поставщика или",
        "а или покупателя",
        "ведении гонконгского международного арбитражного",
        "поставщика на покупателя",
        "настоящему договору",
        "при возникновении проблем",
        "составленным покупателем",
        "участием представителя поставщика",
        "если иное не оговорено сторонами дополнительно",
        "курсы валюты определяется банком плательщика на день",
        "лице татаурова",
        "все дополнения",
        "подписи сторон",
        "реквизиты",
        "подписанные сторонами",
    ],
    clause_indicators: &[
        "на", "по", "с", "в", "и", "или", "для", "от", "к", "о", "при", "если", "все",
        "курсы", "подписи", "день", "это", "момент", "условия", "статья",
    ],
    roles: &["Поставщик", "Покупатель", "Заказчик", "Подрядчик", "Продавец"],
};
