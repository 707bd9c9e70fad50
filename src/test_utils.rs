#[cfg(test)]
pub mod fixtures {
    use std::collections::BTreeMap;
    use std::ops::Range;

    use crate::models::domain::RawCandidate;

    /// Question, choices, answer letter, explanation. Every entry passes the
    /// validator and no two entries collide in the duplicate detector.
    pub const QUESTION_BANK: [(&str, [&str; 4], char, &str); 12] = [
        (
            "What port does HTTPS use?",
            ["21", "443", "80", "3389"],
            'B',
            "HTTPS defaults to TCP port 443.",
        ),
        (
            "Which hash function is considered broken?",
            ["MD5", "SHA-256", "SHA-3", "BLAKE2"],
            'A',
            "Practical MD5 collisions exist.",
        ),
        (
            "Which tool maps open network ports?",
            ["Nmap", "Hashcat", "Ghidra", "Volatility"],
            'A',
            "Nmap is a port scanner.",
        ),
        (
            "What does XSS inject into pages?",
            ["Malicious scripts", "SQL statements", "Kernel modules", "DNS records"],
            'A',
            "XSS runs attacker scripts in the victim browser.",
        ),
        (
            "Which protocol resolves names to IP addresses?",
            ["DNS", "ARP", "SMTP", "SNMP"],
            'A',
            "DNS maps hostnames to addresses.",
        ),
        (
            "What attack floods a target with SYN packets?",
            ["SYN flood", "Pass the hash", "Kerberoasting", "DLL hijacking"],
            'A',
            "Half-open connections exhaust the backlog.",
        ),
        (
            "Which control enforces least privilege for users?",
            ["Role-based access", "Port forwarding", "Disk mirroring", "Log rotation"],
            'A',
            "Roles scope permissions to job needs.",
        ),
        (
            "Where are Windows password hashes stored locally?",
            ["SAM database", "Boot sector", "Page file", "Recycle bin"],
            'A',
            "The SAM hive holds local account hashes.",
        ),
        (
            "Which cipher mode needs a unique nonce?",
            ["GCM", "ECB", "Caesar", "ROT13"],
            'A',
            "Nonce reuse breaks GCM confidentiality.",
        ),
        (
            "What does a WAF primarily inspect?",
            ["HTTP requests", "Disk sectors", "CPU registers", "BIOS settings"],
            'A',
            "A WAF filters application layer traffic.",
        ),
        (
            "Who signs certificates in a PKI?",
            [
                "Certificate authority",
                "Local root user",
                "Default web browser",
                "Outbound mail server",
            ],
            'A',
            "The CA vouches for certificate identities.",
        ),
        (
            "Which log records Linux authentication events?",
            ["auth.log", "dmesg", "fstab", "crontab"],
            'A',
            "Authentication events go to auth.log.",
        ),
    ];

    /// A single well-formed block.
    pub fn https_port_block() -> &'static str {
        "Q: What port does HTTPS use?\nA) 21\nB) 443\nC) 80\nD) 3389\nANSWER: B\nEXPLAIN: HTTPS defaults to TCP port 443.\n---"
    }

    pub fn question_block(index: usize) -> String {
        let (question, choices, answer, explanation) = QUESTION_BANK[index];
        format!(
            "Q: {}\nA) {}\nB) {}\nC) {}\nD) {}\nANSWER: {}\nEXPLAIN: {}\n---",
            question, choices[0], choices[1], choices[2], choices[3], answer, explanation
        )
    }

    /// Completion text holding the bank entries in `range`.
    pub fn question_batch(range: Range<usize>) -> String {
        range.map(question_block).collect::<Vec<_>>().join("\n")
    }

    pub fn raw_candidate(question: &str, choices: [&str; 4], answer: char) -> RawCandidate {
        let choices: BTreeMap<char, String> = ['A', 'B', 'C', 'D']
            .into_iter()
            .zip(choices.iter().map(|c| c.to_string()))
            .collect();

        RawCandidate {
            question: question.to_string(),
            choices,
            answer_letter: Some(answer),
            explanation: Some("It is the expected answer.".to_string()),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::config::GenerationSettings;
    use crate::services::quiz_pipeline::{
        parse_quiz_blocks, CandidateValidator, FingerprintSet, RuleSet,
    };

    #[test]
    fn question_bank_is_valid_and_distinct() {
        let settings = GenerationSettings::default();
        let validator = CandidateValidator::new(settings.clone(), RuleSet::default());
        let mut fingerprints = FingerprintSet::new(settings.question_similarity_threshold);

        let parsed = parse_quiz_blocks(&question_batch(0..QUESTION_BANK.len()), 4);
        assert_eq!(parsed.len(), QUESTION_BANK.len());

        for candidate in &parsed {
            let question = validator
                .validate(candidate)
                .unwrap_or_else(|r| panic!("{:?} rejected: {}", candidate.question, r));
            fingerprints
                .try_accept(&question)
                .unwrap_or_else(|d| panic!("{:?} duplicate: {}", candidate.question, d));
        }
    }

    #[test]
    fn raw_candidate_orders_choices() {
        let raw = raw_candidate("Q?", ["one", "two", "three", "four"], 'C');
        assert_eq!(raw.ordered_choices(), vec!["one", "two", "three", "four"]);
        assert_eq!(raw.answer_letter, Some('C'));
    }
}
