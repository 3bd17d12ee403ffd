//! Static lookup table mapping processor decline codes to human-readable descriptions.
//!
//! Pure data. Unknown codes fall back to [`GENERIC_DECLINE`] at the point where the failure is wrapped into a
//! `SyncError`.

pub const GENERIC_DECLINE: &str = "The card was declined for an unspecified reason";

/// Returns the description for a known processor decline code.
pub fn description(code: &str) -> Option<&'static str> {
    let text = match code {
        "2000" => "Do Not Honor",
        "2001" => "Insufficient Funds",
        "2002" => "Limit Exceeded",
        "2003" => "Cardholder's Activity Limit Exceeded",
        "2004" => "Expired Card",
        "2005" => "Invalid Credit Card Number",
        "2006" => "Invalid Expiration Date",
        "2007" => "No Account",
        "2008" => "Card Account Length Error",
        "2009" => "No Such Issuer",
        "2010" => "Card Issuer Declined CVV",
        "2011" => "Voice Authorization Required",
        "2012" => "Processor Declined - Possible Lost Card",
        "2013" => "Processor Declined - Possible Stolen Card",
        "2014" => "Processor Declined - Fraud Suspected",
        "2015" => "Transaction Not Allowed",
        "2016" => "Duplicate Transaction",
        "2017" => "Cardholder Stopped Billing",
        "2018" => "Cardholder Stopped All Billing",
        "2019" => "Invalid Transaction",
        "2020" => "Violation",
        "2021" => "Security Violation",
        "2022" => "Declined - Updated Cardholder Available",
        "2023" => "Processor Does Not Support This Feature",
        "2024" => "Card Type Not Enabled",
        "2025" => "Set Up Error - Merchant",
        "2026" => "Invalid Merchant ID",
        "2027" => "Set Up Error - Amount",
        "2028" => "Set Up Error - Hierarchy",
        "2029" => "Set Up Error - Card",
        "2030" => "Set Up Error - Terminal",
        "2031" => "Encryption Error",
        "2032" => "Surcharge Not Permitted",
        "2033" => "Inconsistent Data",
        "2034" => "No Action Taken",
        "2035" => "Partial Approval For Amount In Group III Version",
        "2036" => "Authorization could not be found to reverse",
        "2037" => "Already Reversed",
        "2038" => "Processor Declined",
        "2039" => "Invalid Authorization Code",
        "2040" => "Invalid Store",
        "2041" => "Declined - Call For Approval",
        "2043" => "Error - Do Not Retry, Call Issuer",
        "2044" => "Declined - Call Issuer",
        "2045" => "Invalid Merchant Number",
        "2046" => "Declined",
        "2047" => "Call Issuer. Pick Up Card",
        "2053" => "Card reported as lost or stolen",
        "2057" => "Issuer or Cardholder has put a restriction on the card",
        "2062" => "Restricted Transaction",
        "3000" => "Processor Network Unavailable - Try Again",
        _ => return None,
    };
    Some(text)
}
